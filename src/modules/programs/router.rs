use axum::{Router, routing::get};

use super::controller::{
    create_program, delete_program, get_program, list_programs, update_program,
};
use crate::state::AppState;

pub fn init_programs_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_programs).post(create_program))
        .route(
            "/{id}",
            get(get_program).put(update_program).delete(delete_program),
        )
}
