use anyhow::Context;
use sqlx::PgPool;
use tracing::{info, instrument};
use uuid::Uuid;

use classlog_core::AppError;

use crate::metrics::track_contact_logged;
use crate::modules::contacts::model::{Contact, CreateContactDto};

const CONTACT_COLUMNS: &str = "id, contact_type, contact_name, description, student_id, created_at";

pub struct ContactService;

impl ContactService {
    #[instrument(skip(db, dto), fields(student_id = %dto.student_id, contact_type = %dto.contact_type.as_str()))]
    pub async fn create_contact(db: &PgPool, dto: CreateContactDto) -> Result<Contact, AppError> {
        let contact = sqlx::query_as::<_, Contact>(&format!(
            "INSERT INTO contacts (contact_type, contact_name, description, student_id)
             VALUES ($1, $2, $3, $4)
             RETURNING {CONTACT_COLUMNS}"
        ))
        .bind(dto.contact_type)
        .bind(dto.contact_name.trim())
        .bind(dto.description.trim())
        .bind(dto.student_id)
        .fetch_one(db)
        .await
        .map_err(|e| {
            // The student was deleted between the lookup and the insert.
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_foreign_key_violation() {
                    return AppError::not_found(anyhow::anyhow!("Student not found"));
                }
            }
            AppError::database(e)
        })?;

        track_contact_logged(contact.contact_type.as_str());
        info!(contact_id = %contact.id, "Contact logged");

        Ok(contact)
    }

    /// Contacts of a student, newest first.
    #[instrument(skip(db))]
    pub async fn get_contacts_by_student(
        db: &PgPool,
        student_id: Uuid,
    ) -> Result<Vec<Contact>, AppError> {
        let contacts = sqlx::query_as::<_, Contact>(&format!(
            "SELECT {CONTACT_COLUMNS} FROM contacts
             WHERE student_id = $1
             ORDER BY created_at DESC, id"
        ))
        .bind(student_id)
        .fetch_all(db)
        .await
        .context("Failed to fetch contacts")
        .map_err(AppError::database)?;

        Ok(contacts)
    }
}
