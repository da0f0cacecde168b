//! Student data models and DTOs.
//!
//! Re-exports the student models from the `classlog-models` crate.

pub use classlog_models::students::*;
