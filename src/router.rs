use crate::docs::ApiDoc;
use crate::logging::logging_middleware;
use crate::metrics::metrics_middleware;
use crate::modules::auth::router::init_auth_router;
use crate::modules::dashboard::router::init_dashboard_router;
use crate::modules::enrollments::router::init_enrollments_router;
use crate::modules::notifications::router::init_notifications_router;
use crate::modules::profile::router::init_profile_router;
use crate::modules::programs::router::init_programs_router;
use crate::modules::school_years::router::init_school_years_router;
use crate::modules::students::router::init_students_router;
use crate::state::AppState;
use axum::http::{HeaderValue, Method};
use axum::{Json, Router, middleware, routing::get};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable as _};

pub fn init_router(state: AppState) -> Router {
    let media_path = media_mount_path(&state.storage_config.media_base_url);

    let mut router = Router::new()
        .merge(Scalar::with_url("/scalar", ApiDoc::openapi()))
        .route(
            "/api-docs/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        .nest(
            "/api",
            Router::new()
                .nest("/auth", init_auth_router())
                .nest(
                    "/profile",
                    init_profile_router(state.storage_config.max_bytes),
                )
                .nest("/programs", init_programs_router())
                .nest("/school-years", init_school_years_router())
                .nest("/students", init_students_router())
                .nest("/enrollments", init_enrollments_router())
                .nest("/notifications", init_notifications_router())
                .nest("/dashboard", init_dashboard_router()),
        );

    if let Some(path) = media_path {
        router = router.nest_service(
            &path,
            ServeDir::new(state.storage_config.upload_dir.clone()),
        );
    }

    router
        .with_state(state.clone())
        .layer(cors_layer(&state))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(logging_middleware))
}

/// Uploads are served locally only when the media base URL is a path on
/// this server; an absolute URL means another host serves them.
fn media_mount_path(media_base_url: &str) -> Option<String> {
    let trimmed = media_base_url.trim_end_matches('/');
    if trimmed.starts_with('/') && trimmed.len() > 1 {
        Some(trimmed.to_string())
    } else {
        None
    }
}

fn cors_layer(state: &AppState) -> CorsLayer {
    let allowed_origins: Vec<HeaderValue> = state
        .cors_config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::ACCEPT,
        ])
        .allow_credentials(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_mount_path() {
        assert_eq!(media_mount_path("/media"), Some("/media".to_string()));
        assert_eq!(media_mount_path("/media/"), Some("/media".to_string()));
        assert_eq!(media_mount_path("/"), None);
        assert_eq!(media_mount_path("https://cdn.example.com/media"), None);
    }
}
