//! Accounts and roles.

use crate::ids::UserId;
use chrono::{DateTime, Utc};
use registrar_core::permissions::{REQUESTER_PERMISSIONS, REVIEWER_PERMISSIONS};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// Account role. Each role expands to a fixed permission set that is
/// embedded in the access token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Staff,
    Student,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Staff => "staff",
            Role::Student => "student",
        }
    }

    pub fn permissions(&self) -> Vec<String> {
        let reviewer: &[&str] = match self {
            Role::Staff => REVIEWER_PERMISSIONS,
            Role::Student => &[],
        };
        REQUESTER_PERMISSIONS
            .iter()
            .chain(reviewer)
            .map(|p| p.to_string())
            .collect()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "staff" => Ok(Role::Staff),
            "student" => Ok(Role::Student),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// A user account. The password hash is never loaded into this struct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use registrar_core::permissions;

    #[test]
    fn test_student_permissions() {
        let perms = Role::Student.permissions();
        assert!(perms.contains(&permissions::ENROLLMENTS_CREATE.to_string()));
        assert!(perms.contains(&permissions::PROFILE_MANAGE.to_string()));
        assert!(!perms.contains(&permissions::ENROLLMENTS_REVIEW.to_string()));
        assert!(!perms.contains(&permissions::ENROLLMENTS_READ_ALL.to_string()));
        assert!(!perms.contains(&permissions::PROGRAMS_MANAGE.to_string()));
    }

    #[test]
    fn test_staff_permissions_are_a_superset() {
        let staff = Role::Staff.permissions();
        for permission in Role::Student.permissions() {
            assert!(staff.contains(&permission));
        }
        assert!(staff.contains(&permissions::ENROLLMENTS_REVIEW.to_string()));
        assert!(staff.contains(&permissions::STUDENTS_READ.to_string()));
    }

    #[test]
    fn test_role_string_roundtrip() {
        for role in [Role::Staff, Role::Student] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
            assert_eq!(
                serde_json::to_string(&role).unwrap(),
                format!("\"{}\"", role)
            );
        }
        assert!("admin".parse::<Role>().is_err());
    }
}
