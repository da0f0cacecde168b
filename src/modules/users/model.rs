//! User data models and DTOs.
//!
//! Re-exports the user models from the `classlog-models` crate.

pub use classlog_core::UserRole;
pub use classlog_models::users::*;
