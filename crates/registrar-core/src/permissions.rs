//! Permission constants for the Registrar API.
//!
//! Roles expand to a fixed set of these names, which are embedded in the
//! access token. Handlers check permissions, never roles, so the reviewer and
//! requester capabilities stay separate even though only two roles exist.
//!
//! # Example
//!
//! ```ignore
//! use registrar_core::permissions;
//!
//! if auth_user.has_permission(permissions::ENROLLMENTS_REVIEW) {
//!     // approve or reject
//! }
//! ```

// =============================================================================
// Profile
// =============================================================================

/// Permission to create and edit one's own student profile
pub const PROFILE_MANAGE: &str = "profile:manage";

// =============================================================================
// Programs
// =============================================================================

/// Permission to browse the program catalog
pub const PROGRAMS_READ: &str = "programs:read";
/// Permission to create, update, and delete programs
pub const PROGRAMS_MANAGE: &str = "programs:manage";

// =============================================================================
// School years
// =============================================================================

/// Permission to list school years
pub const SCHOOL_YEARS_READ: &str = "school_years:read";
/// Permission to create, update, and delete school years
pub const SCHOOL_YEARS_MANAGE: &str = "school_years:manage";

// =============================================================================
// Students
// =============================================================================

/// Permission to list and view every student record
pub const STUDENTS_READ: &str = "students:read";

// =============================================================================
// Enrollments
// =============================================================================

/// Permission to submit enrollment requests
pub const ENROLLMENTS_CREATE: &str = "enrollments:create";
/// Permission to see every student's enrollments
pub const ENROLLMENTS_READ_ALL: &str = "enrollments:read_all";
/// Permission to edit or delete any enrollment regardless of owner or status
pub const ENROLLMENTS_MANAGE_ALL: &str = "enrollments:manage_all";
/// Permission to approve, reject, and auto-approve enrollments
pub const ENROLLMENTS_REVIEW: &str = "enrollments:review";

// =============================================================================
// Notifications
// =============================================================================

/// Permission to read one's own notifications
pub const NOTIFICATIONS_READ: &str = "notifications:read";

/// Permissions every authenticated account holds.
pub const REQUESTER_PERMISSIONS: &[&str] = &[
    PROFILE_MANAGE,
    PROGRAMS_READ,
    SCHOOL_YEARS_READ,
    ENROLLMENTS_CREATE,
    NOTIFICATIONS_READ,
];

/// Permissions held only by staff.
pub const REVIEWER_PERMISSIONS: &[&str] = &[
    PROGRAMS_MANAGE,
    SCHOOL_YEARS_MANAGE,
    STUDENTS_READ,
    ENROLLMENTS_READ_ALL,
    ENROLLMENTS_MANAGE_ALL,
    ENROLLMENTS_REVIEW,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_sets_are_disjoint() {
        for permission in REVIEWER_PERMISSIONS {
            assert!(!REQUESTER_PERMISSIONS.contains(permission));
        }
    }

    #[test]
    fn test_permission_format() {
        for permission in REQUESTER_PERMISSIONS.iter().chain(REVIEWER_PERMISSIONS) {
            let (resource, action) = permission.split_once(':').unwrap();
            assert!(!resource.is_empty());
            assert!(!action.is_empty());
        }
    }
}
