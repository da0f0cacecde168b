//! Middleware and extractors for authentication and authorization.
//!
//! - [`auth`]: The [`auth::AuthUser`] extractor, which re-derives the caller's
//!   identity from the bearer token on every request
//! - [`role`]: Role-gated route layers and the ownership checks every
//!   class/student/contact handler goes through
//!
//! # Authorization Flow
//!
//! 1. Client sends `Authorization: Bearer <token>`
//! 2. `AuthUser` verifies the token (401 on failure)
//! 3. The handler loads the target resource (404 if missing)
//! 4. `ensure_can_view` / `ensure_can_access` apply the ownership rule (403)
//!
//! # Example
//!
//! ```ignore
//! use crate::middleware::auth::AuthUser;
//! use crate::middleware::role::ensure_can_access;
//!
//! async fn delete_class(auth_user: AuthUser, ...) -> Result<Json<DeletionSummary>, AppError> {
//!     let class = ClassService::get_class(&state.db, id).await?;
//!     ensure_can_access(&auth_user, class.class.created_by_id, "delete this class")?;
//!     // ...
//! }
//! ```

pub mod auth;
pub mod role;
