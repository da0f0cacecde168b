//! # Classlog Models
//!
//! Domain models and DTOs for the Classlog API: database entities, request
//! DTOs with their validation rules, and composite response shapes.
//!
//! # Modules
//!
//! - [`auth`]: Login request and response
//! - [`classes`]: Classes, their status, and class-level responses
//! - [`contacts`]: Contact log entries
//! - [`students`]: Students and student-level responses
//! - [`users`]: User accounts
//!
//! Request DTOs reject unknown fields, so a misspelled key is a 400 rather
//! than a silently ignored value.
//!
//! # Example
//!
//! ```ignore
//! use classlog_models::students::CreateStudentDto;
//! use validator::Validate;
//!
//! let dto: CreateStudentDto = serde_json::from_value(body)?;
//! dto.validate()?;
//! ```

pub mod auth;
pub mod classes;
pub mod contacts;
pub mod students;
pub mod users;

// Re-export commonly used types at crate root for convenience
pub use auth::{LoginRequest, LoginResponse, MessageResponse};

pub use classes::{
    Class, ClassDetail, ClassStatus, ClassSummary, ClassWithCount, ClassWithOwner, CreateClassDto,
    DeletionSummary, UpdateClassDto,
};

pub use contacts::{Contact, ContactQuery, ContactType, CreateContactDto};

pub use students::{
    CreateStudentDto, Student, StudentDetail, StudentQuery, StudentWithContacts, UpdateStudentDto,
};

pub use users::{CreateUserDto, UpdateUserDto, User};
