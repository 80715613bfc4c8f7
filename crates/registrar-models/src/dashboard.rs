//! Role-specific dashboard summaries.

use crate::enrollments::EnrollmentDetails;
use crate::programs::Program;
use crate::students::Student;
use serde::Serialize;
use utoipa::ToSchema;

/// Number of recent enrollments shown on either dashboard.
pub const RECENT_ENROLLMENTS: i64 = 5;

/// Number of open programs suggested to students.
pub const AVAILABLE_PROGRAMS: i64 = 6;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StaffDashboard {
    pub total_students: i64,
    pub active_programs: i64,
    pub pending_enrollments: i64,
    pub approved_enrollments: i64,
    /// Most recent pending enrollments
    pub recent_pending: Vec<EnrollmentDetails>,
    pub unread_notifications: i64,
    pub profile: Option<Student>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StudentDashboard {
    pub profile: Option<Student>,
    pub pending_count: i64,
    pub approved_count: i64,
    pub enrolled_count: i64,
    pub recent_enrollments: Vec<EnrollmentDetails>,
    pub available_programs: Vec<Program>,
    pub unread_notifications: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Dashboard {
    Staff(StaffDashboard),
    Student(StudentDashboard),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dashboard_is_tagged_by_role() {
        let dashboard = Dashboard::Student(StudentDashboard {
            profile: None,
            pending_count: 1,
            approved_count: 0,
            enrolled_count: 0,
            recent_enrollments: vec![],
            available_programs: vec![],
            unread_notifications: 2,
        });
        let json = serde_json::to_value(&dashboard).unwrap();
        assert_eq!(json["role"], "student");
        assert_eq!(json["pending_count"], 1);
        assert_eq!(json["unread_notifications"], 2);
        assert!(json["profile"].is_null());
    }
}
