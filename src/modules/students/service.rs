use anyhow::Context;
use sqlx::PgPool;
use tracing::{info, instrument};
use uuid::Uuid;

use classlog_core::AppError;
use classlog_core::fields::{CPF_DIGITS, digits_only, mask_phone};
use classlog_models::classes::{Class, ClassSummary, DeletionSummary};
use classlog_models::contacts::Contact;

use crate::metrics::{track_cascade_delete, track_student_created};
use crate::modules::students::model::{
    CreateStudentDto, Student, StudentDetail, UpdateStudentDto,
};

const STUDENT_COLUMNS: &str = "id, name, cpf, phone, class_id, created_at, updated_at";
const DUPLICATE_CPF: &str = "A student with this CPF already exists";

fn cpf_conflict(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return AppError::conflict(DUPLICATE_CPF);
        }
    }
    AppError::database(e)
}

pub struct StudentService;

impl StudentService {
    /// Pre-check for a CPF held by any student other than `except`.
    async fn ensure_cpf_available(
        db: &PgPool,
        cpf: &str,
        except: Option<Uuid>,
    ) -> Result<(), AppError> {
        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM students WHERE cpf = $1 AND ($2::uuid IS NULL OR id <> $2))",
        )
        .bind(cpf)
        .bind(except)
        .fetch_one(db)
        .await
        .context("Failed to check CPF")
        .map_err(AppError::database)?;

        if taken {
            return Err(AppError::conflict(DUPLICATE_CPF));
        }

        Ok(())
    }

    /// Inserts a student. CPF is stored as bare digits and phone masked.
    #[instrument(skip(db, dto), fields(class_id = %dto.class_id))]
    pub async fn create_student(db: &PgPool, dto: CreateStudentDto) -> Result<Student, AppError> {
        let cpf = digits_only(&dto.cpf, CPF_DIGITS);
        Self::ensure_cpf_available(db, &cpf, None).await?;

        let student = sqlx::query_as::<_, Student>(&format!(
            "INSERT INTO students (name, cpf, phone, class_id)
             VALUES ($1, $2, $3, $4)
             RETURNING {STUDENT_COLUMNS}"
        ))
        .bind(dto.name.trim())
        .bind(&cpf)
        .bind(mask_phone(&dto.phone))
        .bind(dto.class_id)
        .fetch_one(db)
        .await
        .map_err(cpf_conflict)?;

        track_student_created();
        info!(student_id = %student.id, "Student created");

        Ok(student)
    }

    #[instrument(skip(db))]
    pub async fn get_students_by_class(
        db: &PgPool,
        class_id: Uuid,
    ) -> Result<Vec<Student>, AppError> {
        let students = sqlx::query_as::<_, Student>(&format!(
            "SELECT {STUDENT_COLUMNS} FROM students WHERE class_id = $1 ORDER BY name"
        ))
        .bind(class_id)
        .fetch_all(db)
        .await
        .context("Failed to fetch students by class")
        .map_err(AppError::database)?;

        Ok(students)
    }

    #[instrument(skip(db))]
    pub async fn get_student(db: &PgPool, id: Uuid) -> Result<Student, AppError> {
        sqlx::query_as::<_, Student>(&format!(
            "SELECT {STUDENT_COLUMNS} FROM students WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await
        .context("Failed to fetch student")
        .map_err(AppError::database)?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Student not found")))
    }

    /// The student with its contacts (newest first) and a summary of its class.
    #[instrument(skip(db, student, class), fields(student_id = %student.id))]
    pub async fn get_student_detail(
        db: &PgPool,
        student: Student,
        class: &Class,
    ) -> Result<StudentDetail, AppError> {
        let contacts = sqlx::query_as::<_, Contact>(
            "SELECT id, contact_type, contact_name, description, student_id, created_at
             FROM contacts WHERE student_id = $1
             ORDER BY created_at DESC, id",
        )
        .bind(student.id)
        .fetch_all(db)
        .await
        .context("Failed to fetch student contacts")
        .map_err(AppError::database)?;

        Ok(StudentDetail {
            student,
            contacts,
            class: ClassSummary::from(class),
        })
    }

    #[instrument(skip(db, dto))]
    pub async fn update_student(
        db: &PgPool,
        id: Uuid,
        dto: UpdateStudentDto,
    ) -> Result<Student, AppError> {
        let cpf = dto.cpf.as_deref().map(|c| digits_only(c, CPF_DIGITS));
        if let Some(cpf) = &cpf {
            Self::ensure_cpf_available(db, cpf, Some(id)).await?;
        }

        sqlx::query_as::<_, Student>(&format!(
            "UPDATE students
             SET name = COALESCE($1, name), cpf = COALESCE($2, cpf),
                 phone = COALESCE($3, phone), updated_at = NOW()
             WHERE id = $4
             RETURNING {STUDENT_COLUMNS}"
        ))
        .bind(dto.name.as_deref().map(str::trim))
        .bind(cpf)
        .bind(dto.phone.as_deref().map(mask_phone))
        .bind(id)
        .fetch_optional(db)
        .await
        .map_err(cpf_conflict)?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Student not found")))
    }

    /// Deletes the student's contacts, then the student, in one transaction.
    #[instrument(skip(db))]
    pub async fn delete_student(db: &PgPool, id: Uuid) -> Result<DeletionSummary, AppError> {
        let mut tx = db
            .begin()
            .await
            .context("Failed to begin transaction")
            .map_err(AppError::database)?;

        let contacts_deleted = sqlx::query("DELETE FROM contacts WHERE student_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .context("Failed to delete student contacts")
            .map_err(AppError::database)?
            .rows_affected();

        let students_deleted = sqlx::query("DELETE FROM students WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .context("Failed to delete student")
            .map_err(AppError::database)?
            .rows_affected();

        if students_deleted == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("Student not found")));
        }

        tx.commit()
            .await
            .context("Failed to commit student deletion")
            .map_err(AppError::database)?;

        track_cascade_delete("student", students_deleted, contacts_deleted);
        info!(student_id = %id, contacts_deleted, "Student deleted");

        Ok(DeletionSummary {
            classes_deleted: 0,
            students_deleted,
            contacts_deleted,
        })
    }
}
