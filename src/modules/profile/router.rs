use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

use super::controller::{get_profile, save_profile, upload_picture};
use crate::state::AppState;

/// Multipart framing on top of the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn init_profile_router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/", get(get_profile).put(save_profile))
        .route(
            "/picture",
            post(upload_picture)
                .layer(DefaultBodyLimit::max(max_upload_bytes + MULTIPART_OVERHEAD)),
        )
}
