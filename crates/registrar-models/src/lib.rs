//! # Registrar Models
//!
//! Domain entities, request/response DTOs and the pure rules of the
//! enrollment workflow.
//!
//! - [`ids`]: strongly typed UUID newtypes
//! - [`identifiers`]: human-readable student and enrollment ID formats
//! - [`users`]: accounts and the [`Role`] to permission mapping
//! - [`auth`]: registration and login payloads
//! - [`students`]: student profiles
//! - [`programs`]: academic programs
//! - [`school_years`]: school years and semesters
//! - [`enrollments`]: enrollments, status rules and list scoping
//! - [`notifications`]: per-user notifications
//! - [`dashboard`]: role-specific summaries

pub mod auth;
pub mod dashboard;
pub mod enrollments;
pub mod identifiers;
pub mod ids;
pub mod notifications;
pub mod programs;
pub mod school_years;
pub mod students;
pub mod users;

pub use enrollments::{
    Enrollment, EnrollmentAccess, EnrollmentDetails, EnrollmentScope, EnrollmentStatus,
    EnrollmentView, WorkflowError,
};
pub use identifiers::IdError;
pub use ids::{EnrollmentId, NotificationId, ProgramId, SchoolYearId, StudentId, UserId};
pub use notifications::{Notification, NotificationType};
pub use programs::{Program, ProgramType};
pub use school_years::{SchoolYear, Semester};
pub use students::{Gender, Student};
pub use users::{Role, User};
