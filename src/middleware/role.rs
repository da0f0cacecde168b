//! Role-gated route layers and ownership checks.
//!
//! Route layers (`require_admin`) gate whole routers by role. Per-resource
//! decisions go through [`ensure_can_view`] and [`ensure_can_access`], thin
//! wrappers over the predicates in `classlog_core::permissions` that turn a
//! denial into a 403 and record it.

use axum::{
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;
use uuid::Uuid;

use classlog_core::permissions::{can_access, can_create_class, can_view};
use classlog_core::{AppError, UserRole};

use crate::metrics::track_authorization_check;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Checks that the authenticated user holds one of `allowed_roles`.
///
/// ```rust,ignore
/// let admin_routes = Router::new()
///     .route("/", get(list_users))
///     .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));
/// ```
pub async fn require_roles(
    state: &AppState,
    req: Request,
    next: Next,
    allowed_roles: &[UserRole],
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    let auth_user = AuthUser::from_request_parts(&mut parts, state).await?;

    let permitted = auth_user
        .known_role()
        .map(|role| allowed_roles.contains(&role))
        .unwrap_or(false);

    track_authorization_check(permitted, auth_user.role());

    if !permitted {
        warn!(role = %auth_user.role(), "Role check failed");
        return Err(AppError::forbidden(format!(
            "Access denied. Required roles: {}",
            allowed_roles
                .iter()
                .map(UserRole::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        )));
    }

    Ok(next.run(Request::from_parts(parts, body)).await)
}

/// Layer for admin-only routes.
pub async fn require_admin(State(state): State<AppState>, req: Request, next: Next) -> Response {
    match require_roles(&state, req, next, &[UserRole::Admin]).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

/// Read access to a resource whose class was created by `owner_id`.
pub fn ensure_can_view(
    auth_user: &AuthUser,
    owner_id: Uuid,
    owner_role: UserRole,
    action: &str,
) -> Result<(), AppError> {
    let actor_id = auth_user.user_id()?;
    let allowed = can_view(actor_id, auth_user.role(), owner_id, owner_role);
    deny_unless(allowed, auth_user, action)
}

/// Write access (update, delete, add children) to a resource whose class was
/// created by `owner_id`.
pub fn ensure_can_access(
    auth_user: &AuthUser,
    owner_id: Uuid,
    action: &str,
) -> Result<(), AppError> {
    let actor_id = auth_user.user_id()?;
    let allowed = can_access(actor_id, auth_user.role(), owner_id);
    deny_unless(allowed, auth_user, action)
}

pub fn ensure_can_create_class(auth_user: &AuthUser) -> Result<(), AppError> {
    deny_unless(
        can_create_class(auth_user.role()),
        auth_user,
        "create classes",
    )
}

fn deny_unless(allowed: bool, auth_user: &AuthUser, action: &str) -> Result<(), AppError> {
    track_authorization_check(allowed, auth_user.role());

    if allowed {
        return Ok(());
    }

    warn!(user = %auth_user.0.sub, role = %auth_user.role(), action, "Access denied");
    Err(AppError::forbidden(format!("Not authorized to {}", action)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use classlog_auth::Claims;

    fn auth_user(id: Uuid, role: &str) -> AuthUser {
        AuthUser(Claims {
            sub: id.to_string(),
            email: "user@example.com".to_string(),
            role: role.to_string(),
            exp: 9999999999,
            iat: 1234567890,
        })
    }

    #[test]
    fn test_ensure_can_access_owner() {
        let teacher = Uuid::new_v4();
        assert!(ensure_can_access(&auth_user(teacher, "TEACHER"), teacher, "edit").is_ok());
    }

    #[test]
    fn test_ensure_can_access_denied_is_forbidden() {
        let err = ensure_can_access(
            &auth_user(Uuid::new_v4(), "TEACHER"),
            Uuid::new_v4(),
            "update this class",
        )
        .unwrap_err();
        assert_eq!(err.status.as_u16(), 403);
        assert_eq!(err.error.to_string(), "Not authorized to update this class");
    }

    #[test]
    fn test_ensure_can_access_privileged() {
        let owner = Uuid::new_v4();
        assert!(ensure_can_access(&auth_user(Uuid::new_v4(), "ADMIN"), owner, "x").is_ok());
        assert!(ensure_can_access(&auth_user(Uuid::new_v4(), "COORDINATOR"), owner, "x").is_ok());
        assert!(ensure_can_access(&auth_user(Uuid::new_v4(), "COORDENADOR"), owner, "x").is_err());
    }

    #[test]
    fn test_ensure_can_view_shared_class() {
        let teacher = auth_user(Uuid::new_v4(), "TEACHER");
        let coordinator = Uuid::new_v4();
        assert!(ensure_can_view(&teacher, coordinator, UserRole::Coordinator, "view").is_ok());
        assert!(ensure_can_view(&teacher, Uuid::new_v4(), UserRole::Teacher, "view").is_err());
    }

    #[test]
    fn test_ensure_can_create_class() {
        assert!(ensure_can_create_class(&auth_user(Uuid::new_v4(), "TEACHER")).is_ok());
        assert!(ensure_can_create_class(&auth_user(Uuid::new_v4(), "COORDENADOR")).is_err());
    }
}
