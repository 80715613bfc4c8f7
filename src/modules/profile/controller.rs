use anyhow::anyhow;
use axum::{
    Json,
    extract::{Multipart, State},
    http::StatusCode,
};
use registrar_core::AppError;
use registrar_models::Student;
use registrar_models::students::StudentProfileDto;
use tracing::instrument;
use utoipa::ToSchema;

use super::service::ProfileService;
use crate::middleware::auth::{AuthUser, RequireProfileManage};
use crate::modules::auth::controller::ErrorResponse;
use crate::state::AppState;
use crate::validator::ValidatedJson;

const PICTURE_FIELD: &str = "picture";

/// Multipart body for `POST /api/profile/picture`.
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct PictureUpload {
    /// PNG, JPEG or WebP image
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub picture: Vec<u8>,
}

#[utoipa::path(
    get,
    path = "/api/profile",
    responses(
        (status = 200, description = "Own student profile", body = Student),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "No profile yet", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Profile"
)]
#[instrument(skip(state, auth_user))]
pub async fn get_profile(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Student>, AppError> {
    let student = ProfileService::get_profile(&state.db, auth_user.user_id()?).await?;
    Ok(Json(student))
}

/// Create or update the caller's profile
#[utoipa::path(
    put,
    path = "/api/profile",
    request_body = StudentProfileDto,
    responses(
        (status = 200, description = "Profile updated", body = Student),
        (status = 201, description = "Profile created and student ID assigned", body = Student),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse),
        (status = 503, description = "No free student ID for this year", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Profile"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn save_profile(
    State(state): State<AppState>,
    RequireProfileManage(auth_user): RequireProfileManage,
    ValidatedJson(dto): ValidatedJson<StudentProfileDto>,
) -> Result<(StatusCode, Json<Student>), AppError> {
    let (student, created) = ProfileService::save_profile(
        &state.db,
        auth_user.user_id()?,
        &dto,
        state.registration.student_id_max_attempts,
    )
    .await?;

    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(student)))
}

#[utoipa::path(
    post,
    path = "/api/profile/picture",
    request_body(content = PictureUpload, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Picture replaced", body = Student),
        (status = 400, description = "Missing or unreadable picture field", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 422, description = "Wrong file type, too large, or no profile yet", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Profile"
)]
#[instrument(skip(state, auth_user, multipart))]
pub async fn upload_picture(
    State(state): State<AppState>,
    RequireProfileManage(auth_user): RequireProfileManage,
    mut multipart: Multipart,
) -> Result<Json<Student>, AppError> {
    let user_id = auth_user.user_id()?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(anyhow!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some(PICTURE_FIELD) {
            continue;
        }

        let content_type = field
            .content_type()
            .map(str::to_string)
            .unwrap_or_default();
        let content = field
            .bytes()
            .await
            .map_err(|e| AppError::bad_request(anyhow!("Failed to read upload: {}", e)))?;

        let student = ProfileService::replace_picture(
            &state.db,
            state.storage.as_ref(),
            user_id,
            &content_type,
            &content,
        )
        .await?;
        return Ok(Json(student));
    }

    Err(AppError::bad_request(anyhow!(
        "Multipart field '{}' is required",
        PICTURE_FIELD
    )))
}
