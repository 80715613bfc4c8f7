use axum::{
    Json,
    extract::{Path, Query, State},
};
use registrar_core::AppError;
use registrar_models::notifications::{
    MarkReadResponse, NotificationFilterParams, NotificationListResponse,
};
use registrar_models::{Notification, NotificationId};
use tracing::instrument;

use super::service::NotificationService;
use crate::middleware::auth::RequireNotificationsRead;
use crate::modules::auth::controller::ErrorResponse;
use crate::state::AppState;

/// List own notifications
///
/// `mark_read=true` marks every notification read before listing.
#[utoipa::path(
    get,
    path = "/api/notifications",
    params(NotificationFilterParams),
    responses(
        (status = 200, description = "Notifications, newest first, with the unread count", body = NotificationListResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Notifications"
)]
#[instrument(skip(state, auth_user))]
pub async fn list_notifications(
    State(state): State<AppState>,
    RequireNotificationsRead(auth_user): RequireNotificationsRead,
    Query(filters): Query<NotificationFilterParams>,
) -> Result<Json<NotificationListResponse>, AppError> {
    let user_id = auth_user.user_id()?;

    if filters.mark_read.unwrap_or(false) {
        NotificationService::mark_all_read(&state.db, user_id).await?;
    }

    let notifications = NotificationService::list_for_user(&state.db, user_id, &filters).await?;
    let unread_count = NotificationService::unread_count(&state.db, user_id).await?;

    Ok(Json(NotificationListResponse {
        notifications,
        unread_count,
    }))
}

#[utoipa::path(
    post,
    path = "/api/notifications/{id}/read",
    params(("id" = NotificationId, Path, description = "Notification ID")),
    responses(
        (status = 200, description = "Notification marked as read", body = Notification),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Notification not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Notifications"
)]
#[instrument(skip(state, auth_user))]
pub async fn mark_notification_read(
    State(state): State<AppState>,
    RequireNotificationsRead(auth_user): RequireNotificationsRead,
    Path(id): Path<NotificationId>,
) -> Result<Json<Notification>, AppError> {
    let notification =
        NotificationService::mark_read(&state.db, auth_user.user_id()?, id).await?;
    Ok(Json(notification))
}

#[utoipa::path(
    post,
    path = "/api/notifications/read-all",
    responses(
        (status = 200, description = "Number of notifications marked as read", body = MarkReadResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Notifications"
)]
#[instrument(skip(state, auth_user))]
pub async fn mark_all_notifications_read(
    State(state): State<AppState>,
    RequireNotificationsRead(auth_user): RequireNotificationsRead,
) -> Result<Json<MarkReadResponse>, AppError> {
    let updated = NotificationService::mark_all_read(&state.db, auth_user.user_id()?).await?;
    Ok(Json(MarkReadResponse { updated }))
}
