//! Classes and class-level response shapes.
//!
//! A class owns its students, which own their contacts. `created_by_id` is
//! fixed at insert and decides who may touch anything below the class.

use chrono::{DateTime, Utc};
use classlog_core::UserRole;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::students::StudentWithContacts;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "class_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClassStatus {
    #[default]
    Active,
    Inactive,
}

impl ClassStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClassStatus::Active => "ACTIVE",
            ClassStatus::Inactive => "INACTIVE",
        }
    }
}

#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct Class {
    pub id: Uuid,
    pub name: String,
    pub status: ClassStatus,
    pub created_by_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A class joined with its creator's role, used for read-visibility checks.
#[derive(FromRow, Debug, Clone)]
pub struct ClassWithOwner {
    #[sqlx(flatten)]
    pub class: Class,
    #[sqlx(try_from = "String")]
    pub owner_role: UserRole,
}

/// List entry: a class with the number of students enrolled.
#[derive(Serialize, FromRow, Debug, Clone, ToSchema)]
pub struct ClassWithCount {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub class: Class,
    pub student_count: i64,
}

/// A class with every student and each student's contacts.
#[derive(Serialize, Debug, Clone, ToSchema)]
pub struct ClassDetail {
    #[serde(flatten)]
    pub class: Class,
    pub students: Vec<StudentWithContacts>,
}

/// The slice of a class embedded in student responses.
#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct ClassSummary {
    pub id: Uuid,
    pub name: String,
    pub created_by_id: Uuid,
}

impl From<&Class> for ClassSummary {
    fn from(class: &Class) -> Self {
        Self {
            id: class.id,
            name: class.name.clone(),
            created_by_id: class.created_by_id,
        }
    }
}

#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateClassDto {
    #[validate(
        length(max = 100, message = "Name must be at most 100 characters"),
        custom(function = "classlog_core::fields::validate_not_blank", message = "Name is required")
    )]
    pub name: String,
    #[serde(default)]
    pub status: ClassStatus,
}

#[derive(Deserialize, Debug, Clone, Default, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateClassDto {
    #[validate(
        length(max = 100, message = "Name must be at most 100 characters"),
        custom(function = "classlog_core::fields::validate_not_blank", message = "Name is required")
    )]
    pub name: Option<String>,
    pub status: Option<ClassStatus>,
}

/// Row counts removed by a cascading delete.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, ToSchema)]
pub struct DeletionSummary {
    pub classes_deleted: u64,
    pub students_deleted: u64,
    pub contacts_deleted: u64,
}
