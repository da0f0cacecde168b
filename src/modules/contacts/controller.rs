use axum::{Json, extract::State, http::StatusCode};
use tracing::instrument;

use classlog_core::AppError;

use crate::middleware::auth::AuthUser;
use crate::middleware::role::{ensure_can_access, ensure_can_view};
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::classes::service::ClassService;
use crate::modules::contacts::model::{Contact, ContactQuery, CreateContactDto};
use crate::modules::contacts::service::ContactService;
use crate::modules::students::service::StudentService;
use crate::state::AppState;
use crate::validator::{ValidatedJson, ValidatedQuery};

/// Log a contact with a student's family
#[utoipa::path(
    post,
    path = "/api/contacts",
    request_body = CreateContactDto,
    responses(
        (status = 201, description = "Contact logged", body = Contact),
        (status = 400, description = "Bad request - validation error", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Student not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Contacts"
)]
#[instrument(skip(state, auth_user, dto), fields(user_id = %auth_user.0.sub))]
pub async fn create_contact(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateContactDto>,
) -> Result<(StatusCode, Json<Contact>), AppError> {
    let student = StudentService::get_student(&state.db, dto.student_id).await?;
    let class = ClassService::get_class(&state.db, student.class_id).await?;
    ensure_can_access(
        &auth_user,
        class.class.created_by_id,
        "add contacts to this student",
    )?;

    let contact = ContactService::create_contact(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(contact)))
}

/// List a student's contacts, newest first
#[utoipa::path(
    get,
    path = "/api/contacts",
    params(
        ContactQuery
    ),
    responses(
        (status = 200, description = "Contacts, newest first", body = Vec<Contact>),
        (status = 400, description = "student_id is missing", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Student not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Contacts"
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.0.sub))]
pub async fn get_contacts(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedQuery(params): ValidatedQuery<ContactQuery>,
) -> Result<Json<Vec<Contact>>, AppError> {
    let student_id = params
        .student_id
        .ok_or_else(|| AppError::bad_request(anyhow::anyhow!("student_id is required")))?;

    let student = StudentService::get_student(&state.db, student_id).await?;
    let class = ClassService::get_class(&state.db, student.class_id).await?;
    ensure_can_view(
        &auth_user,
        class.class.created_by_id,
        class.owner_role,
        "view contacts of this student",
    )?;

    let contacts = ContactService::get_contacts_by_student(&state.db, student_id).await?;
    Ok(Json(contacts))
}
