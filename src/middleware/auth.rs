use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use registrar_auth::{Claims, verify_token};
use registrar_core::AppError;
use registrar_core::permissions;
use registrar_models::UserId;

use crate::state::AppState;

/// Extractor that validates the bearer JWT and exposes its claims.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    /// Also used directly by handlers whose behaviour widens with a
    /// permission rather than being gated by it.
    pub fn has_permission(&self, permission: &str) -> bool {
        self.0.has_permission(permission)
    }

    pub fn user_id(&self) -> Result<UserId, AppError> {
        self.0
            .sub
            .parse::<UserId>()
            .map_err(|_| AppError::unauthorized("Invalid user ID in token".to_string()))
    }

    pub fn username(&self) -> &str {
        &self.0.username
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("Missing authorization header".to_string()))?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::unauthorized("Invalid authorization header format".to_string())
        })?;

        let claims = verify_token(token, &state.jwt_config)?;

        Ok(AuthUser(claims))
    }
}

/// Declares an extractor that authenticates the caller and then requires one
/// permission, answering 403 when it is missing.
#[macro_export]
macro_rules! require_permission {
    ($name:ident, $permission:expr) => {
        #[derive(Debug, Clone)]
        pub struct $name(pub $crate::middleware::auth::AuthUser);

        impl axum::extract::FromRequestParts<$crate::state::AppState> for $name {
            type Rejection = registrar_core::AppError;

            async fn from_request_parts(
                parts: &mut axum::http::request::Parts,
                state: &$crate::state::AppState,
            ) -> Result<Self, Self::Rejection> {
                let auth_user =
                    $crate::middleware::auth::AuthUser::from_request_parts(parts, state).await?;

                if !auth_user.has_permission($permission) {
                    return Err(registrar_core::AppError::forbidden(format!(
                        "Access denied. Missing required permission: {}",
                        $permission
                    )));
                }

                Ok($name(auth_user))
            }
        }
    };
}

require_permission!(RequireProfileManage, permissions::PROFILE_MANAGE);

require_permission!(RequireProgramsRead, permissions::PROGRAMS_READ);
require_permission!(RequireProgramsManage, permissions::PROGRAMS_MANAGE);

require_permission!(RequireSchoolYearsRead, permissions::SCHOOL_YEARS_READ);
require_permission!(RequireSchoolYearsManage, permissions::SCHOOL_YEARS_MANAGE);

require_permission!(RequireStudentsRead, permissions::STUDENTS_READ);

require_permission!(RequireEnrollmentsCreate, permissions::ENROLLMENTS_CREATE);
require_permission!(RequireEnrollmentsReview, permissions::ENROLLMENTS_REVIEW);

require_permission!(RequireNotificationsRead, permissions::NOTIFICATIONS_READ);
