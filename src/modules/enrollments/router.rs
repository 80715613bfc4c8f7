use axum::{
    Router,
    routing::{get, post},
};

use super::controller::{
    approve_enrollment, create_enrollment, delete_enrollment, get_enrollment, list_enrollments,
    reject_enrollment, update_enrollment,
};
use crate::state::AppState;

pub fn init_enrollments_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_enrollments).post(create_enrollment))
        .route(
            "/{id}",
            get(get_enrollment)
                .put(update_enrollment)
                .delete(delete_enrollment),
        )
        .route("/{id}/approve", post(approve_enrollment))
        .route("/{id}/reject", post(reject_enrollment))
}
