//! # Classlog Core
//!
//! Core types, errors, and utilities for the Classlog API.
//!
//! - [`errors`]: Application error type with HTTP response conversion
//! - [`fields`]: CPF/phone masks and name/email validators
//! - [`password`]: Password hashing and verification
//! - [`permissions`]: User roles and the ownership-based access rule
//!
//! # Example
//!
//! ```ignore
//! use classlog_core::errors::AppError;
//! use classlog_core::fields::mask_cpf;
//! use classlog_core::permissions::can_access;
//!
//! let error = AppError::not_found(anyhow::anyhow!("Student not found"));
//! assert_eq!(mask_cpf("12345678901"), "123.456.789-01");
//! ```

pub mod errors;
pub mod fields;
pub mod password;
pub mod permissions;

// Re-export commonly used types at crate root
pub use errors::AppError;
pub use password::{hash_password, verify_password};
pub use permissions::{UserRole, can_access, can_view};
