use axum::{Router, routing::get};

use super::controller::{get_student, list_students};
use crate::state::AppState;

pub fn init_students_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_students))
        .route("/{id}", get(get_student))
}
