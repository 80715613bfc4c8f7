use axum::{
    Router,
    routing::{get, post},
};

use super::controller::{
    list_notifications, mark_all_notifications_read, mark_notification_read,
};
use crate::state::AppState;

pub fn init_notifications_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_notifications))
        .route("/read-all", post(mark_all_notifications_read))
        .route("/{id}/read", post(mark_notification_read))
}
