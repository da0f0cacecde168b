use axum::{Json, extract::State, http::StatusCode};
use tracing::instrument;
use uuid::Uuid;

use classlog_core::AppError;
use classlog_models::classes::DeletionSummary;

use crate::middleware::auth::AuthUser;
use crate::middleware::role::{ensure_can_access, ensure_can_view};
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::classes::service::ClassService;
use crate::modules::students::model::{
    CreateStudentDto, Student, StudentDetail, StudentQuery, UpdateStudentDto,
};
use crate::modules::students::service::StudentService;
use crate::state::AppState;
use crate::validator::{ValidatedJson, ValidatedPath, ValidatedQuery};

#[utoipa::path(
    post,
    path = "/api/students",
    request_body = CreateStudentDto,
    responses(
        (status = 201, description = "Student created successfully", body = Student),
        (status = 400, description = "Bad request - validation error or duplicate CPF", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Class not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Students"
)]
#[instrument(skip(state, auth_user, dto), fields(user_id = %auth_user.0.sub))]
pub async fn create_student(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateStudentDto>,
) -> Result<(StatusCode, Json<Student>), AppError> {
    let class = ClassService::get_class(&state.db, dto.class_id).await?;
    ensure_can_access(
        &auth_user,
        class.class.created_by_id,
        "add students to this class",
    )?;

    let student = StudentService::create_student(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(student)))
}

/// List the students of a class
#[utoipa::path(
    get,
    path = "/api/students",
    params(
        StudentQuery
    ),
    responses(
        (status = 200, description = "Students of the class", body = Vec<Student>),
        (status = 400, description = "class_id is missing", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Class not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Students"
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.0.sub))]
pub async fn get_students(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedQuery(params): ValidatedQuery<StudentQuery>,
) -> Result<Json<Vec<Student>>, AppError> {
    let class_id = params
        .class_id
        .ok_or_else(|| AppError::bad_request(anyhow::anyhow!("class_id is required")))?;

    let class = ClassService::get_class(&state.db, class_id).await?;
    ensure_can_view(
        &auth_user,
        class.class.created_by_id,
        class.owner_role,
        "view students of this class",
    )?;

    let students = StudentService::get_students_by_class(&state.db, class_id).await?;
    Ok(Json(students))
}

/// Get a student with contacts and class summary
#[utoipa::path(
    get,
    path = "/api/students/{id}",
    params(
        ("id" = Uuid, Path, description = "Student ID")
    ),
    responses(
        (status = 200, description = "Student details", body = StudentDetail),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Student not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Students"
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.0.sub))]
pub async fn get_student(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedPath(id): ValidatedPath<Uuid>,
) -> Result<Json<StudentDetail>, AppError> {
    let student = StudentService::get_student(&state.db, id).await?;
    let class = ClassService::get_class(&state.db, student.class_id).await?;
    ensure_can_view(
        &auth_user,
        class.class.created_by_id,
        class.owner_role,
        "view this student",
    )?;

    let detail = StudentService::get_student_detail(&state.db, student, &class.class).await?;
    Ok(Json(detail))
}

#[utoipa::path(
    put,
    path = "/api/students/{id}",
    params(
        ("id" = Uuid, Path, description = "Student ID")
    ),
    request_body = UpdateStudentDto,
    responses(
        (status = 200, description = "Student updated successfully", body = Student),
        (status = 400, description = "Bad request - validation error or duplicate CPF", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Student not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Students"
)]
#[instrument(skip(state, auth_user, dto), fields(user_id = %auth_user.0.sub))]
pub async fn update_student(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedPath(id): ValidatedPath<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateStudentDto>,
) -> Result<Json<Student>, AppError> {
    let student = StudentService::get_student(&state.db, id).await?;
    let class = ClassService::get_class(&state.db, student.class_id).await?;
    ensure_can_access(&auth_user, class.class.created_by_id, "update this student")?;

    let student = StudentService::update_student(&state.db, id, dto).await?;
    Ok(Json(student))
}

/// Delete a student together with its contacts
#[utoipa::path(
    delete,
    path = "/api/students/{id}",
    params(
        ("id" = Uuid, Path, description = "Student ID")
    ),
    responses(
        (status = 200, description = "Student deleted; row counts per table", body = DeletionSummary),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Student not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Students"
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.0.sub))]
pub async fn delete_student(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedPath(id): ValidatedPath<Uuid>,
) -> Result<Json<DeletionSummary>, AppError> {
    let student = StudentService::get_student(&state.db, id).await?;
    let class = ClassService::get_class(&state.db, student.class_id).await?;
    ensure_can_access(&auth_user, class.class.created_by_id, "delete this student")?;

    let summary = StudentService::delete_student(&state.db, id).await?;
    Ok(Json(summary))
}
