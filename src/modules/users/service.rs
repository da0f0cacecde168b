use anyhow::Context;
use sqlx::PgPool;
use tracing::{info, instrument};
use uuid::Uuid;

use classlog_core::{AppError, hash_password};

use crate::metrics::track_user_created;
use crate::modules::users::model::{CreateUserDto, UpdateUserDto, User};

const USER_COLUMNS: &str = "id, name, email, role, created_at, updated_at";

fn email_conflict(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return AppError::conflict("A user with this email already exists");
        }
    }
    AppError::database(e)
}

pub struct UserService;

impl UserService {
    #[instrument(skip(db, dto), fields(email = %dto.email, role = %dto.role))]
    pub async fn create_user(db: &PgPool, dto: CreateUserDto) -> Result<User, AppError> {
        let hashed_password = hash_password(&dto.password)?;

        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (name, email, password, role)
             VALUES ($1, $2, $3, $4)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(dto.name.trim())
        .bind(dto.email.trim().to_lowercase())
        .bind(&hashed_password)
        .bind(dto.role.as_str())
        .fetch_one(db)
        .await
        .map_err(email_conflict)?;

        track_user_created(user.role.as_str());
        info!(user_id = %user.id, "User created");

        Ok(user)
    }

    #[instrument(skip(db))]
    pub async fn get_users(db: &PgPool) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY name, email"
        ))
        .fetch_all(db)
        .await
        .context("Failed to fetch users")
        .map_err(AppError::database)?;

        Ok(users)
    }

    #[instrument(skip(db))]
    pub async fn find_user(db: &PgPool, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await
        .context("Failed to fetch user")
        .map_err(AppError::database)?;

        Ok(user)
    }

    pub async fn get_user(db: &PgPool, id: Uuid) -> Result<User, AppError> {
        Self::find_user(db, id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("User not found")))
    }

    #[instrument(skip(db, dto))]
    pub async fn update_user(db: &PgPool, id: Uuid, dto: UpdateUserDto) -> Result<User, AppError> {
        let existing = Self::get_user(db, id).await?;

        let name = dto
            .name
            .map(|n| n.trim().to_string())
            .unwrap_or(existing.name);
        let email = dto
            .email
            .map(|e| e.trim().to_lowercase())
            .unwrap_or(existing.email);
        let role = dto.role.unwrap_or(existing.role);
        let hashed_password = dto.password.as_deref().map(hash_password).transpose()?;

        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users
             SET name = $1, email = $2, role = $3,
                 password = COALESCE($4, password), updated_at = NOW()
             WHERE id = $5
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&name)
        .bind(&email)
        .bind(role.as_str())
        .bind(hashed_password)
        .bind(id)
        .fetch_optional(db)
        .await
        .map_err(email_conflict)?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("User not found")))?;

        Ok(user)
    }

    /// Deletes a user. Refused while the user still owns classes, since class
    /// ownership is never reassigned.
    #[instrument(skip(db))]
    pub async fn delete_user(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        Self::get_user(db, id).await?;

        let owned_classes: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM classes WHERE created_by_id = $1")
                .bind(id)
                .fetch_one(db)
                .await
                .context("Failed to count owned classes")
                .map_err(AppError::database)?;

        if owned_classes > 0 {
            return Err(AppError::conflict(format!(
                "User still owns {} class(es); delete them first",
                owned_classes
            )));
        }

        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(db)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_foreign_key_violation() {
                        return AppError::conflict("User still owns classes; delete them first");
                    }
                }
                AppError::database(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("User not found")));
        }

        info!(user_id = %id, "User deleted");
        Ok(())
    }
}
