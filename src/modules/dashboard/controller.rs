use axum::{Json, extract::State};
use registrar_core::{AppError, permissions};
use registrar_models::dashboard::Dashboard;
use tracing::instrument;

use super::service::DashboardService;
use crate::middleware::auth::AuthUser;
use crate::modules::auth::controller::ErrorResponse;
use crate::state::AppState;

/// Summary for the caller: the review queue for reviewers, own enrollments
/// otherwise
#[utoipa::path(
    get,
    path = "/api/dashboard",
    responses(
        (status = 200, description = "Dashboard tagged by `role`", body = Dashboard),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Dashboard"
)]
#[instrument(skip(state, auth_user))]
pub async fn get_dashboard(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Dashboard>, AppError> {
    let user_id = auth_user.user_id()?;

    let dashboard = if auth_user.has_permission(permissions::ENROLLMENTS_READ_ALL) {
        Dashboard::Staff(DashboardService::staff_dashboard(&state.db, user_id).await?)
    } else {
        Dashboard::Student(DashboardService::student_dashboard(&state.db, user_id).await?)
    };

    Ok(Json(dashboard))
}
