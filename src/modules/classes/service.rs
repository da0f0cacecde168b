use std::collections::HashMap;

use anyhow::Context;
use sqlx::PgPool;
use tracing::{info, instrument};
use uuid::Uuid;

use classlog_core::{AppError, UserRole};
use classlog_models::contacts::Contact;
use classlog_models::students::{Student, StudentWithContacts};

use crate::metrics::{track_cascade_delete, track_class_created};
use crate::modules::classes::model::{
    Class, ClassDetail, ClassWithCount, ClassWithOwner, CreateClassDto, DeletionSummary,
    UpdateClassDto,
};

const CLASS_COLUMNS: &str = "id, name, status, created_by_id, created_at, updated_at";

pub struct ClassService;

impl ClassService {
    #[instrument(skip(db, dto))]
    pub async fn create_class(
        db: &PgPool,
        dto: CreateClassDto,
        created_by_id: Uuid,
    ) -> Result<Class, AppError> {
        let class = sqlx::query_as::<_, Class>(&format!(
            "INSERT INTO classes (name, status, created_by_id)
             VALUES ($1, $2, $3)
             RETURNING {CLASS_COLUMNS}"
        ))
        .bind(dto.name.trim())
        .bind(dto.status)
        .bind(created_by_id)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_foreign_key_violation() {
                    return AppError::unauthorized("User no longer exists");
                }
            }
            AppError::database(e)
        })?;

        track_class_created(class.status.as_str());
        info!(class_id = %class.id, "Class created");

        Ok(class)
    }

    /// Classes the actor may read, each with its student count, newest first.
    ///
    /// Privileged actors see every class. Everyone else sees the classes they
    /// created plus those created by an `ADMIN` or `COORDINATOR`.
    #[instrument(skip(db))]
    pub async fn get_visible_classes(
        db: &PgPool,
        actor_id: Uuid,
        actor_role: &str,
    ) -> Result<Vec<ClassWithCount>, AppError> {
        let privileged = UserRole::parse(actor_role)
            .map(|role| role.is_privileged())
            .unwrap_or(false);

        let classes = sqlx::query_as::<_, ClassWithCount>(
            "SELECT c.id, c.name, c.status, c.created_by_id, c.created_at, c.updated_at,
                    COUNT(s.id) AS student_count
             FROM classes c
             JOIN users u ON u.id = c.created_by_id
             LEFT JOIN students s ON s.class_id = c.id
             WHERE $1 OR c.created_by_id = $2 OR u.role IN ('ADMIN', 'COORDINATOR')
             GROUP BY c.id
             ORDER BY c.created_at DESC, c.name",
        )
        .bind(privileged)
        .bind(actor_id)
        .fetch_all(db)
        .await
        .context("Failed to fetch classes")
        .map_err(AppError::database)?;

        Ok(classes)
    }

    /// Loads a class with its creator's role.
    #[instrument(skip(db))]
    pub async fn get_class(db: &PgPool, id: Uuid) -> Result<ClassWithOwner, AppError> {
        sqlx::query_as::<_, ClassWithOwner>(
            "SELECT c.id, c.name, c.status, c.created_by_id, c.created_at, c.updated_at,
                    u.role AS owner_role
             FROM classes c
             JOIN users u ON u.id = c.created_by_id
             WHERE c.id = $1",
        )
        .bind(id)
        .fetch_optional(db)
        .await
        .context("Failed to fetch class")
        .map_err(AppError::database)?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Class not found")))
    }

    /// The class with every student and each student's contacts, newest first.
    #[instrument(skip(db, class), fields(class_id = %class.id))]
    pub async fn get_class_detail(db: &PgPool, class: Class) -> Result<ClassDetail, AppError> {
        let students = sqlx::query_as::<_, Student>(
            "SELECT id, name, cpf, phone, class_id, created_at, updated_at
             FROM students WHERE class_id = $1 ORDER BY name",
        )
        .bind(class.id)
        .fetch_all(db)
        .await
        .context("Failed to fetch class students")
        .map_err(AppError::database)?;

        let student_ids: Vec<Uuid> = students.iter().map(|s| s.id).collect();

        let contacts = sqlx::query_as::<_, Contact>(
            "SELECT id, contact_type, contact_name, description, student_id, created_at
             FROM contacts WHERE student_id = ANY($1)
             ORDER BY created_at DESC, id",
        )
        .bind(&student_ids)
        .fetch_all(db)
        .await
        .context("Failed to fetch class contacts")
        .map_err(AppError::database)?;

        let mut by_student: HashMap<Uuid, Vec<Contact>> = HashMap::new();
        for contact in contacts {
            by_student.entry(contact.student_id).or_default().push(contact);
        }

        let students = students
            .into_iter()
            .map(|student| StudentWithContacts {
                contacts: by_student.remove(&student.id).unwrap_or_default(),
                student,
            })
            .collect();

        Ok(ClassDetail { class, students })
    }

    /// Updates name and status. `created_by_id` is never written.
    #[instrument(skip(db, dto))]
    pub async fn update_class(
        db: &PgPool,
        id: Uuid,
        dto: UpdateClassDto,
    ) -> Result<Class, AppError> {
        sqlx::query_as::<_, Class>(&format!(
            "UPDATE classes
             SET name = COALESCE($1, name), status = COALESCE($2, status), updated_at = NOW()
             WHERE id = $3
             RETURNING {CLASS_COLUMNS}"
        ))
        .bind(dto.name.as_deref().map(str::trim))
        .bind(dto.status)
        .bind(id)
        .fetch_optional(db)
        .await
        .context("Failed to update class")
        .map_err(AppError::database)?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Class not found")))
    }

    /// Deletes the class's contacts, then its students, then the class, in
    /// one transaction. Any failure rolls back every step.
    #[instrument(skip(db))]
    pub async fn delete_class(db: &PgPool, id: Uuid) -> Result<DeletionSummary, AppError> {
        let mut tx = db
            .begin()
            .await
            .context("Failed to begin transaction")
            .map_err(AppError::database)?;

        let contacts_deleted = sqlx::query(
            "DELETE FROM contacts
             WHERE student_id IN (SELECT id FROM students WHERE class_id = $1)",
        )
        .bind(id)
        .execute(&mut *tx)
        .await
        .context("Failed to delete class contacts")
        .map_err(AppError::database)?
        .rows_affected();

        let students_deleted = sqlx::query("DELETE FROM students WHERE class_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .context("Failed to delete class students")
            .map_err(AppError::database)?
            .rows_affected();

        let classes_deleted = sqlx::query("DELETE FROM classes WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .context("Failed to delete class")
            .map_err(AppError::database)?
            .rows_affected();

        if classes_deleted == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("Class not found")));
        }

        tx.commit()
            .await
            .context("Failed to commit class deletion")
            .map_err(AppError::database)?;

        track_cascade_delete("class", students_deleted, contacts_deleted);
        info!(
            class_id = %id,
            students_deleted,
            contacts_deleted,
            "Class deleted"
        );

        Ok(DeletionSummary {
            classes_deleted,
            students_deleted,
            contacts_deleted,
        })
    }
}
