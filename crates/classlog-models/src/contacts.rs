//! Contact log entries. Append-only: created, never updated, removed only
//! when their student is deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "contact_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContactType {
    Phone,
    Email,
    Whatsapp,
}

impl ContactType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContactType::Phone => "PHONE",
            ContactType::Email => "EMAIL",
            ContactType::Whatsapp => "WHATSAPP",
        }
    }
}

#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct Contact {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub contact_type: ContactType,
    /// The person who was contacted
    pub contact_name: String,
    pub description: String,
    pub student_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateContactDto {
    #[serde(rename = "type")]
    pub contact_type: ContactType,
    #[validate(
        length(max = 100, message = "Contact name must be at most 100 characters"),
        custom(function = "classlog_core::fields::validate_not_blank", message = "Contact name is required")
    )]
    pub contact_name: String,
    #[validate(custom(
        function = "classlog_core::fields::validate_not_blank",
        message = "Description is required"
    ))]
    pub description: String,
    pub student_id: Uuid,
}

#[derive(Deserialize, Debug, Clone, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct ContactQuery {
    /// Student whose contacts are listed (required)
    pub student_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_contact_uses_type_key() {
        let dto: CreateContactDto = serde_json::from_value(json!({
            "type": "WHATSAPP",
            "contact_name": "Maria (mother)",
            "description": "Talked about attendance",
            "student_id": Uuid::new_v4()
        }))
        .unwrap();
        assert!(dto.validate().is_ok());
        assert_eq!(dto.contact_type, ContactType::Whatsapp);
    }

    #[test]
    fn test_create_contact_rejects_unknown_type() {
        let result = serde_json::from_value::<CreateContactDto>(json!({
            "type": "SMS",
            "contact_name": "Maria",
            "description": "x",
            "student_id": Uuid::new_v4()
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_create_contact_blank_description() {
        let dto = CreateContactDto {
            contact_type: ContactType::Phone,
            contact_name: "Maria".to_string(),
            description: "  ".to_string(),
            student_id: Uuid::new_v4(),
        };
        let errors = dto.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("description"));
    }

    #[test]
    fn test_contact_serializes_type_field() {
        let contact = Contact {
            id: Uuid::new_v4(),
            contact_type: ContactType::Email,
            contact_name: "Paulo".to_string(),
            description: "Sent report card".to_string(),
            student_id: Uuid::new_v4(),
            created_at: Utc::now(),
        };
        let value = serde_json::to_value(&contact).unwrap();
        assert_eq!(value["type"], "EMAIL");
        assert!(value.get("contact_type").is_none());
    }
}
