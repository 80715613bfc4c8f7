//! Feature modules. Each has a `controller` (HTTP handlers with OpenAPI
//! annotations), a `service` (queries and business rules) and a `router`.

pub mod auth;
pub mod dashboard;
pub mod enrollments;
pub mod notifications;
pub mod profile;
pub mod programs;
pub mod school_years;
pub mod students;
