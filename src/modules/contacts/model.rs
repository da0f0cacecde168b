//! Contact log models and DTOs.
//!
//! Re-exports the contact models from the `classlog-models` crate.

pub use classlog_models::contacts::*;
