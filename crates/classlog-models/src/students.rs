//! Students and student-level response shapes.
//!
//! CPF is stored as eleven bare digits; phone is stored masked.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::classes::ClassSummary;
use crate::contacts::Contact;

#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct Student {
    pub id: Uuid,
    pub name: String,
    pub cpf: String,
    pub phone: String,
    pub class_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize, Debug, Clone, ToSchema)]
pub struct StudentWithContacts {
    #[serde(flatten)]
    pub student: Student,
    pub contacts: Vec<Contact>,
}

#[derive(Serialize, Debug, Clone, ToSchema)]
pub struct StudentDetail {
    #[serde(flatten)]
    pub student: Student,
    pub contacts: Vec<Contact>,
    pub class: ClassSummary,
}

#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateStudentDto {
    #[validate(
        length(max = 100, message = "Name must be at most 100 characters"),
        custom(function = "classlog_core::fields::validate_full_name")
    )]
    pub name: String,
    /// Eleven digits, with or without the `000.000.000-00` mask
    #[validate(custom(function = "classlog_core::fields::validate_cpf"))]
    pub cpf: String,
    #[validate(custom(function = "classlog_core::fields::validate_phone"))]
    pub phone: String,
    pub class_id: Uuid,
}

#[derive(Deserialize, Debug, Clone, Default, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateStudentDto {
    #[validate(
        length(max = 100, message = "Name must be at most 100 characters"),
        custom(function = "classlog_core::fields::validate_full_name")
    )]
    pub name: Option<String>,
    #[validate(custom(function = "classlog_core::fields::validate_cpf"))]
    pub cpf: Option<String>,
    #[validate(custom(function = "classlog_core::fields::validate_phone"))]
    pub phone: Option<String>,
}

#[derive(Deserialize, Debug, Clone, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct StudentQuery {
    /// Class whose students are listed (required)
    pub class_id: Option<Uuid>,
}
