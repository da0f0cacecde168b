//! Class data models and DTOs.
//!
//! Re-exports the class models from the `classlog-models` crate.

pub use classlog_models::classes::*;
