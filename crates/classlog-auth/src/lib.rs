//! # Classlog Auth
//!
//! Authentication types and JWT utilities for the Classlog API.
//!
//! - [`claims`]: The claims carried by an access token
//! - [`jwt`]: Token creation and verification
//!
//! There is a single token type: a bearer access token that carries the user
//! id, email, and role. Identity is re-derived from it on every request.
//!
//! # Example
//!
//! ```ignore
//! use classlog_auth::{create_access_token, verify_token};
//! use classlog_config::JwtConfig;
//! use classlog_core::UserRole;
//!
//! let config = JwtConfig::from_env();
//! let token = create_access_token(user_id, "teacher@school.com", UserRole::Teacher, &config)?;
//! let claims = verify_token(&token, &config)?;
//! assert_eq!(claims.role, "TEACHER");
//! ```

pub mod claims;
pub mod jwt;

// Re-export commonly used types at crate root
pub use claims::Claims;
pub use jwt::{create_access_token, verify_token};
