//! Roles and the ownership-based access rule for the Classlog API.
//!
//! Every class, student, and contact belongs to exactly one class, and every
//! class has a fixed creator. Access to any of them is decided by one rule:
//!
//! - `ADMIN` and `COORDINATOR` may access everything.
//! - Anyone else may access a resource only when they created its class.
//!
//! Role strings come straight from the token claims. A string that is not one
//! of the known roles (for example the misspelled `COORDENADOR`) grants no
//! privilege; the actor is then treated like any non-privileged user.
//!
//! # Example
//!
//! ```ignore
//! use classlog_core::permissions::{can_access, UserRole};
//!
//! if !can_access(actor_id, UserRole::Teacher.as_str(), class.created_by_id) {
//!     return Err(AppError::forbidden("Not authorized to update this class"));
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

/// The role attached to every user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Admin,
    Coordinator,
    Teacher,
}

impl UserRole {
    pub const ALL: [UserRole; 3] = [UserRole::Admin, UserRole::Coordinator, UserRole::Teacher];

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "ADMIN",
            UserRole::Coordinator => "COORDINATOR",
            UserRole::Teacher => "TEACHER",
        }
    }

    /// Roles that bypass the ownership check.
    pub fn is_privileged(&self) -> bool {
        matches!(self, UserRole::Admin | UserRole::Coordinator)
    }

    /// Parses a role string, returning `None` for anything unrecognized.
    pub fn parse(role: &str) -> Option<UserRole> {
        role.parse().ok()
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not a known role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRole(pub String);

impl fmt::Display for UnknownRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown role: {}", self.0)
    }
}

impl std::error::Error for UnknownRole {}

impl FromStr for UserRole {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADMIN" => Ok(UserRole::Admin),
            "COORDINATOR" => Ok(UserRole::Coordinator),
            "TEACHER" => Ok(UserRole::Teacher),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

impl TryFrom<String> for UserRole {
    type Error = UnknownRole;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Decides whether an actor may view, edit, or delete a resource whose class
/// was created by `owner_id`.
pub fn can_access(actor_id: Uuid, actor_role: &str, owner_id: Uuid) -> bool {
    let privileged = UserRole::parse(actor_role)
        .map(|role| role.is_privileged())
        .unwrap_or(false);

    privileged || actor_id == owner_id
}

/// Read access. Classes created by an `ADMIN` or `COORDINATOR` are shared with
/// every authenticated user; everything else falls back to [`can_access`].
pub fn can_view(actor_id: Uuid, actor_role: &str, owner_id: Uuid, owner_role: UserRole) -> bool {
    owner_role.is_privileged() || can_access(actor_id, actor_role, owner_id)
}

/// Any recognized role may create classes.
pub fn can_create_class(actor_role: &str) -> bool {
    UserRole::parse(actor_role).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROLES: [&str; 4] = ["ADMIN", "COORDINATOR", "TEACHER", "COORDENADOR"];

    #[test]
    fn test_can_access_table() {
        let actor = Uuid::new_v4();
        let other = Uuid::new_v4();

        for role in ROLES {
            for owns in [true, false] {
                let owner = if owns { actor } else { other };
                let expected = role == "ADMIN" || role == "COORDINATOR" || owns;
                assert_eq!(
                    can_access(actor, role, owner),
                    expected,
                    "role={} owns={}",
                    role,
                    owns
                );
            }
        }
    }

    #[test]
    fn test_unknown_role_is_not_privileged() {
        let actor = Uuid::new_v4();
        assert!(!can_access(actor, "COORDENADOR", Uuid::new_v4()));
        assert!(!can_access(actor, "", Uuid::new_v4()));
        assert!(!can_access(actor, "admin", Uuid::new_v4()));
    }

    #[test]
    fn test_can_view_shared_classes() {
        let teacher = Uuid::new_v4();
        let coordinator = Uuid::new_v4();
        let other_teacher = Uuid::new_v4();

        assert!(can_view(teacher, "TEACHER", coordinator, UserRole::Coordinator));
        assert!(can_view(teacher, "TEACHER", coordinator, UserRole::Admin));
        assert!(!can_view(teacher, "TEACHER", other_teacher, UserRole::Teacher));
        assert!(can_view(teacher, "TEACHER", teacher, UserRole::Teacher));
        assert!(can_view(coordinator, "COORDINATOR", other_teacher, UserRole::Teacher));
    }

    #[test]
    fn test_teacher_cannot_edit_coordinator_class() {
        let teacher = Uuid::new_v4();
        let coordinator = Uuid::new_v4();
        assert!(can_view(teacher, "TEACHER", coordinator, UserRole::Coordinator));
        assert!(!can_access(teacher, "TEACHER", coordinator));
    }

    #[test]
    fn test_can_create_class() {
        for role in UserRole::ALL {
            assert!(can_create_class(role.as_str()));
        }
        assert!(!can_create_class("COORDENADOR"));
    }

    #[test]
    fn test_role_round_trip() {
        for role in UserRole::ALL {
            assert_eq!(UserRole::parse(role.as_str()), Some(role));
            assert_eq!(
                serde_json::to_string(&role).unwrap(),
                format!("\"{}\"", role.as_str())
            );
        }
        assert!(UserRole::try_from("STUDENT".to_string()).is_err());
    }
}
