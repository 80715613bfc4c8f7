//! Enrollments and the rules of the review workflow.
//!
//! ```text
//! pending ──approve──▶ approved
//!    │
//!    └────reject────▶ rejected
//! ```
//!
//! `approved`, `rejected`, `enrolled` and `dropped` are terminal here; nothing
//! reopens a reviewed enrollment. The functions in this module decide what an
//! actor may do and which status results, without touching the database, so
//! the services only have to apply the outcome.

use crate::ids::{EnrollmentId, ProgramId, SchoolYearId, StudentId, UserId};
use crate::notifications::NotificationType;
use crate::school_years::Semester;
use chrono::{DateTime, Utc};
use registrar_core::AppError;
use registrar_core::serde::{
    deserialize_optional_enum, deserialize_optional_string, deserialize_optional_uuid,
};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "enrollment_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EnrollmentStatus {
    Pending,
    Approved,
    Rejected,
    Enrolled,
    Dropped,
}

impl EnrollmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnrollmentStatus::Pending => "pending",
            EnrollmentStatus::Approved => "approved",
            EnrollmentStatus::Rejected => "rejected",
            EnrollmentStatus::Enrolled => "enrolled",
            EnrollmentStatus::Dropped => "dropped",
        }
    }

    /// Only pending enrollments can be approved or rejected.
    pub fn is_reviewable(&self) -> bool {
        *self == EnrollmentStatus::Pending
    }

    /// Status after applying `decision`, or `NotPending` when this status is
    /// not reviewable.
    pub fn review(self, decision: &ReviewDecision) -> Result<EnrollmentStatus, WorkflowError> {
        if self.is_reviewable() {
            Ok(decision.target_status())
        } else {
            Err(WorkflowError::NotPending)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    #[error("Pending enrollment not found")]
    NotPending,

    #[error("A reason is required to reject an enrollment")]
    MissingReason,

    #[error("Please complete your student profile first")]
    ProfileRequired,

    #[error("Student is already enrolled in this program for this school year")]
    DuplicateEnrollment,

    #[error("Selected program is not active")]
    InactiveProgram,

    #[error("Selected school year is not active")]
    InactiveSchoolYear,

    #[error("You can only modify pending enrollments")]
    NotEditable,

    #[error("You do not have access to this enrollment")]
    AccessDenied,

    #[error("Only staff can create enrollments for other students")]
    ActOnBehalfDenied,

    #[error("Only reviewers can auto-approve enrollments")]
    AutoApproveDenied,
}

impl WorkflowError {
    pub fn into_app_error(self) -> AppError {
        match self {
            WorkflowError::NotPending => AppError::not_found(self),
            WorkflowError::MissingReason
            | WorkflowError::ProfileRequired
            | WorkflowError::InactiveProgram
            | WorkflowError::InactiveSchoolYear => AppError::unprocessable(self),
            WorkflowError::DuplicateEnrollment => AppError::conflict(self),
            WorkflowError::NotEditable
            | WorkflowError::AccessDenied
            | WorkflowError::ActOnBehalfDenied
            | WorkflowError::AutoApproveDenied => AppError::forbidden(self.to_string()),
        }
    }
}

/// A reviewer's decision on a pending enrollment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewDecision {
    Approve { notes: Option<String> },
    Reject { reason: String },
}

impl ReviewDecision {
    pub fn approve(notes: Option<String>) -> Self {
        let notes = notes
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        ReviewDecision::Approve { notes }
    }

    /// Fails with `MissingReason` on an empty or whitespace-only reason.
    pub fn reject(reason: &str) -> Result<Self, WorkflowError> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(WorkflowError::MissingReason);
        }
        Ok(ReviewDecision::Reject {
            reason: reason.to_string(),
        })
    }

    pub fn target_status(&self) -> EnrollmentStatus {
        match self {
            ReviewDecision::Approve { .. } => EnrollmentStatus::Approved,
            ReviewDecision::Reject { .. } => EnrollmentStatus::Rejected,
        }
    }

    pub fn notification_type(&self) -> NotificationType {
        match self {
            ReviewDecision::Approve { .. } => NotificationType::EnrollmentApproved,
            ReviewDecision::Reject { .. } => NotificationType::EnrollmentRejected,
        }
    }

    /// Stored in `admin_notes`; the rejection reason doubles as the note.
    pub fn admin_notes(&self) -> Option<&str> {
        match self {
            ReviewDecision::Approve { notes } => notes.as_deref(),
            ReviewDecision::Reject { reason } => Some(reason),
        }
    }

    pub fn notification_message(&self, program_name: &str) -> String {
        match self {
            ReviewDecision::Approve { .. } => {
                format!("Your enrollment for {} has been approved!", program_name)
            }
            ReviewDecision::Reject { reason } => format!(
                "Your enrollment for {} has been rejected. Reason: {}",
                program_name, reason
            ),
        }
    }
}

/// Message sent when a reviewer creates an enrollment already approved.
pub fn confirmation_message(program_name: &str) -> String {
    format!("Your enrollment for {} has been confirmed.", program_name)
}

/// What the caller may do with one particular enrollment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnrollmentAccess {
    pub can_read_all: bool,
    pub can_manage_all: bool,
    pub is_owner: bool,
}

impl EnrollmentAccess {
    pub fn check_view(&self) -> Result<(), WorkflowError> {
        if self.can_read_all || self.is_owner {
            Ok(())
        } else {
            Err(WorkflowError::AccessDenied)
        }
    }

    /// Managers edit at any status, owners only while pending.
    pub fn check_update(&self, status: EnrollmentStatus) -> Result<(), WorkflowError> {
        self.check_modify(status)
    }

    /// Same rule as updates: managers always, owners only while pending.
    pub fn check_delete(&self, status: EnrollmentStatus) -> Result<(), WorkflowError> {
        self.check_modify(status)
    }

    fn check_modify(&self, status: EnrollmentStatus) -> Result<(), WorkflowError> {
        if self.can_manage_all {
            Ok(())
        } else if !self.is_owner {
            Err(WorkflowError::AccessDenied)
        } else if status == EnrollmentStatus::Pending {
            Ok(())
        } else {
            Err(WorkflowError::NotEditable)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum EnrollmentView {
    #[default]
    All,
    My,
}

/// Which rows an enrollment listing may return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrollmentScope {
    All,
    Student(StudentId),
    /// Caller has no profile and no global read access.
    Nothing,
}

impl EnrollmentScope {
    /// Callers without global read access always get their own rows,
    /// whatever `view` they ask for. Staff asking for `my` without a
    /// profile of their own fall back to everything.
    pub fn resolve(
        can_read_all: bool,
        own_student: Option<StudentId>,
        view: Option<EnrollmentView>,
    ) -> Self {
        match (can_read_all, view.unwrap_or_default(), own_student) {
            (false, _, Some(student)) => EnrollmentScope::Student(student),
            (false, _, None) => EnrollmentScope::Nothing,
            (true, EnrollmentView::My, Some(student)) => EnrollmentScope::Student(student),
            (true, _, _) => EnrollmentScope::All,
        }
    }
}

/// Which student a new enrollment belongs to and in what state it starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreationPlan {
    pub student_id: StudentId,
    pub auto_approve: bool,
    /// Whether a caller-supplied fee may override the program's tuition.
    pub fee_override_allowed: bool,
}

/// Caller capabilities relevant to creating an enrollment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreateCapabilities {
    pub can_manage_all: bool,
    pub can_review: bool,
    pub own_student: Option<StudentId>,
}

impl CreateCapabilities {
    pub fn plan(
        &self,
        requested_student: Option<StudentId>,
        auto_approve: bool,
    ) -> Result<CreationPlan, WorkflowError> {
        if auto_approve && !self.can_review {
            return Err(WorkflowError::AutoApproveDenied);
        }

        let student_id = match requested_student {
            Some(student) if Some(student) == self.own_student => student,
            Some(student) if self.can_manage_all => student,
            Some(_) => return Err(WorkflowError::ActOnBehalfDenied),
            None => self.own_student.ok_or(WorkflowError::ProfileRequired)?,
        };

        Ok(CreationPlan {
            student_id,
            auto_approve,
            fee_override_allowed: self.can_manage_all,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Enrollment {
    pub id: EnrollmentId,
    #[schema(example = "ENR-2024-00001")]
    pub enrollment_id: String,
    pub student_id: StudentId,
    pub program_id: ProgramId,
    pub school_year_id: SchoolYearId,
    pub year_level: i16,
    pub status: EnrollmentStatus,
    pub total_fee_cents: i64,
    pub reviewed_by: Option<UserId>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub admin_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Enrollment joined with the student, program, school year and reviewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct EnrollmentDetails {
    pub id: EnrollmentId,
    pub enrollment_id: String,
    pub student_id: StudentId,
    /// Human-readable student ID
    pub student_number: String,
    pub student_name: String,
    pub student_user_id: UserId,
    pub program_id: ProgramId,
    pub program_code: String,
    pub program_name: String,
    pub school_year_id: SchoolYearId,
    pub school_year_start: i32,
    pub school_year_end: i32,
    pub semester: Semester,
    pub year_level: i16,
    pub status: EnrollmentStatus,
    pub total_fee_cents: i64,
    pub reviewed_by: Option<UserId>,
    pub reviewer_username: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub admin_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateEnrollmentDto {
    pub program_id: ProgramId,
    pub school_year_id: SchoolYearId,
    #[validate(range(min = 1, max = 5))]
    pub year_level: i16,
    /// Defaults to the program's tuition. Only honored for staff.
    #[validate(range(min = 0))]
    pub total_fee_cents: Option<i64>,
    /// Staff only: enroll this student instead of the caller.
    pub student_id: Option<StudentId>,
    /// Reviewers only: create the enrollment already approved.
    #[serde(default)]
    pub auto_approve: bool,
    pub admin_notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateEnrollmentDto {
    pub program_id: Option<ProgramId>,
    pub school_year_id: Option<SchoolYearId>,
    #[validate(range(min = 1, max = 5))]
    pub year_level: Option<i16>,
    /// Staff only
    #[validate(range(min = 0))]
    pub total_fee_cents: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct ApproveEnrollmentDto {
    #[validate(length(max = 2000))]
    pub admin_notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct RejectEnrollmentDto {
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub reason: String,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
pub struct EnrollmentFilterParams {
    /// `all` (default for staff) or `my`
    #[serde(default, deserialize_with = "deserialize_optional_enum")]
    pub view: Option<EnrollmentView>,
    #[serde(default, deserialize_with = "deserialize_optional_enum")]
    pub status: Option<EnrollmentStatus>,
    /// Case-insensitive match on enrollment ID, student name or ID, program code or name
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub search: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    pub school_year_id: Option<Uuid>,
}
