//! Authentication models.
//!
//! Re-exports the login models from the `classlog-models` crate together with
//! the token claims from `classlog-auth`.

pub use classlog_auth::Claims;
pub use classlog_models::auth::*;
