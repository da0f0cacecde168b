use axum::{Json, extract::State, http::StatusCode};
use tracing::instrument;
use uuid::Uuid;

use classlog_core::AppError;

use crate::middleware::auth::AuthUser;
use crate::middleware::role::{ensure_can_access, ensure_can_create_class, ensure_can_view};
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::classes::model::{
    Class, ClassDetail, ClassWithCount, CreateClassDto, DeletionSummary, UpdateClassDto,
};
use crate::modules::classes::service::ClassService;
use crate::state::AppState;
use crate::validator::{ValidatedJson, ValidatedPath};

#[utoipa::path(
    post,
    path = "/api/classes",
    request_body = CreateClassDto,
    responses(
        (status = 201, description = "Class created successfully", body = Class),
        (status = 400, description = "Bad request - validation error", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Classes"
)]
#[instrument(skip(state, auth_user, dto), fields(user_id = %auth_user.0.sub))]
pub async fn create_class(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateClassDto>,
) -> Result<(StatusCode, Json<Class>), AppError> {
    ensure_can_create_class(&auth_user)?;

    let class = ClassService::create_class(&state.db, dto, auth_user.user_id()?).await?;
    Ok((StatusCode::CREATED, Json(class)))
}

/// List the classes visible to the caller, with student counts
#[utoipa::path(
    get,
    path = "/api/classes",
    responses(
        (status = 200, description = "Visible classes", body = Vec<ClassWithCount>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Classes"
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.0.sub))]
pub async fn get_classes(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Vec<ClassWithCount>>, AppError> {
    let classes =
        ClassService::get_visible_classes(&state.db, auth_user.user_id()?, auth_user.role())
            .await?;
    Ok(Json(classes))
}

/// Get a class with its students and their contacts
#[utoipa::path(
    get,
    path = "/api/classes/{id}",
    params(
        ("id" = Uuid, Path, description = "Class ID")
    ),
    responses(
        (status = 200, description = "Class details", body = ClassDetail),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Class not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Classes"
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.0.sub))]
pub async fn get_class(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedPath(id): ValidatedPath<Uuid>,
) -> Result<Json<ClassDetail>, AppError> {
    let found = ClassService::get_class(&state.db, id).await?;
    ensure_can_view(
        &auth_user,
        found.class.created_by_id,
        found.owner_role,
        "view this class",
    )?;

    let detail = ClassService::get_class_detail(&state.db, found.class).await?;
    Ok(Json(detail))
}

#[utoipa::path(
    put,
    path = "/api/classes/{id}",
    params(
        ("id" = Uuid, Path, description = "Class ID")
    ),
    request_body = UpdateClassDto,
    responses(
        (status = 200, description = "Class updated successfully", body = Class),
        (status = 400, description = "Bad request - validation error", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Class not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Classes"
)]
#[instrument(skip(state, auth_user, dto), fields(user_id = %auth_user.0.sub))]
pub async fn update_class(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedPath(id): ValidatedPath<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateClassDto>,
) -> Result<Json<Class>, AppError> {
    let found = ClassService::get_class(&state.db, id).await?;
    ensure_can_access(&auth_user, found.class.created_by_id, "update this class")?;

    let class = ClassService::update_class(&state.db, id, dto).await?;
    Ok(Json(class))
}

/// Delete a class together with its students and their contacts
#[utoipa::path(
    delete,
    path = "/api/classes/{id}",
    params(
        ("id" = Uuid, Path, description = "Class ID")
    ),
    responses(
        (status = 200, description = "Class deleted; row counts per table", body = DeletionSummary),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Class not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Classes"
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.0.sub))]
pub async fn delete_class(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedPath(id): ValidatedPath<Uuid>,
) -> Result<Json<DeletionSummary>, AppError> {
    let found = ClassService::get_class(&state.db, id).await?;
    ensure_can_access(&auth_user, found.class.created_by_id, "delete this class")?;

    let summary = ClassService::delete_class(&state.db, id).await?;
    Ok(Json(summary))
}
