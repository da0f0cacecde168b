use sqlx::{FromRow, PgPool};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use classlog_auth::create_access_token;
use classlog_config::JwtConfig;
use classlog_core::{AppError, verify_password};

use crate::metrics::{track_jwt_issued, track_user_login_failure, track_user_login_success};
use crate::modules::users::model::User;
use crate::modules::users::service::UserService;

use super::model::{LoginRequest, LoginResponse};

const INVALID_CREDENTIALS: &str = "Invalid email or password";

#[derive(FromRow)]
struct UserWithPassword {
    #[sqlx(flatten)]
    user: User,
    password: String,
}

pub struct AuthService;

impl AuthService {
    #[instrument(skip(db, jwt_config))]
    pub async fn login_user(
        db: &PgPool,
        dto: LoginRequest,
        jwt_config: &JwtConfig,
    ) -> Result<LoginResponse, AppError> {
        let email = dto.email.trim().to_lowercase();

        let record = sqlx::query_as::<_, UserWithPassword>(
            "SELECT id, name, email, role, created_at, updated_at, password
             FROM users WHERE email = $1",
        )
        .bind(&email)
        .fetch_optional(db)
        .await?;

        let Some(record) = record else {
            warn!("Login attempt for unknown email");
            track_user_login_failure("user_not_found");
            return Err(AppError::unauthorized(INVALID_CREDENTIALS));
        };

        if !verify_password(&dto.password, &record.password)? {
            warn!(user_id = %record.user.id, "Login attempt with wrong password");
            track_user_login_failure("invalid_password");
            return Err(AppError::unauthorized(INVALID_CREDENTIALS));
        }

        let user = record.user;
        let access_token = create_access_token(user.id, &user.email, user.role, jwt_config)?;

        track_jwt_issued();
        track_user_login_success(user.role.as_str());
        info!(user_id = %user.id, role = %user.role, "User logged in");

        Ok(LoginResponse {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: jwt_config.access_token_expiry,
            user,
        })
    }

    /// The profile behind a token. A token whose user has since been deleted
    /// no longer authenticates anyone.
    #[instrument(skip(db))]
    pub async fn get_profile(db: &PgPool, user_id: Uuid) -> Result<User, AppError> {
        UserService::find_user(db, user_id)
            .await?
            .ok_or_else(|| AppError::unauthorized("User no longer exists"))
    }
}
