//! Request extractors for authentication and permission checks.
//!
//! 1. Client sends `Authorization: Bearer <token>`
//! 2. [`auth::AuthUser`] validates the JWT and exposes its claims
//! 3. Permission extractors built with `require_permission!` answer 403 when
//!    the token lacks the permission
//!
//! ```ignore
//! use crate::middleware::auth::{AuthUser, RequireProgramsManage};
//!
//! async fn list_enrollments(auth_user: AuthUser) -> Result<_, AppError> {
//!     let sees_everything = auth_user.has_permission(permissions::ENROLLMENTS_READ_ALL);
//!     // ...
//! }
//!
//! async fn create_program(RequireProgramsManage(auth_user): RequireProgramsManage) {
//!     // only runs with "programs:manage"
//! }
//! ```

pub mod auth;
