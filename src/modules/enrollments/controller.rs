use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use registrar_core::{AppError, permissions};
use registrar_models::enrollments::{
    ApproveEnrollmentDto, CreateEnrollmentDto, EnrollmentFilterParams, RejectEnrollmentDto,
    ReviewDecision, UpdateEnrollmentDto,
};
use registrar_models::{EnrollmentDetails, EnrollmentId, WorkflowError};
use tracing::instrument;

use super::service::{Actor, EnrollmentService};
use crate::middleware::auth::{AuthUser, RequireEnrollmentsCreate, RequireEnrollmentsReview};
use crate::modules::auth::controller::ErrorResponse;
use crate::state::AppState;
use crate::validator::ValidatedJson;

fn actor(auth_user: &AuthUser) -> Result<Actor, AppError> {
    Ok(Actor {
        user_id: auth_user.user_id()?,
        can_read_all: auth_user.has_permission(permissions::ENROLLMENTS_READ_ALL),
        can_manage_all: auth_user.has_permission(permissions::ENROLLMENTS_MANAGE_ALL),
        can_review: auth_user.has_permission(permissions::ENROLLMENTS_REVIEW),
    })
}

/// List enrollments visible to the caller
///
/// Reviewers see everything (`view=my` narrows to their own profile);
/// everyone else only ever sees their own enrollments.
#[utoipa::path(
    get,
    path = "/api/enrollments",
    params(EnrollmentFilterParams),
    responses(
        (status = 200, description = "Enrollments, newest first", body = Vec<EnrollmentDetails>),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Enrollments"
)]
#[instrument(skip(state, auth_user))]
pub async fn list_enrollments(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(filters): Query<EnrollmentFilterParams>,
) -> Result<Json<Vec<EnrollmentDetails>>, AppError> {
    let actor = actor(&auth_user)?;
    let scope = EnrollmentService::resolve_scope(&state.db, actor, &filters).await?;
    let enrollments = EnrollmentService::list_enrollments(&state.db, scope, &filters).await?;
    Ok(Json(enrollments))
}

#[utoipa::path(
    post,
    path = "/api/enrollments",
    request_body = CreateEnrollmentDto,
    responses(
        (status = 201, description = "Enrollment created", body = EnrollmentDetails),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Auto-approve or acting for another student without permission", body = ErrorResponse),
        (status = 404, description = "Program, school year or student not found", body = ErrorResponse),
        (status = 409, description = "Already enrolled in this program for this school year", body = ErrorResponse),
        (status = 422, description = "Validation error, inactive program or school year, or no profile", body = ErrorResponse),
        (status = 503, description = "Enrollment ID sequence exhausted", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Enrollments"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn create_enrollment(
    State(state): State<AppState>,
    RequireEnrollmentsCreate(auth_user): RequireEnrollmentsCreate,
    ValidatedJson(dto): ValidatedJson<CreateEnrollmentDto>,
) -> Result<(StatusCode, Json<EnrollmentDetails>), AppError> {
    let enrollment =
        EnrollmentService::create_enrollment(&state.db, actor(&auth_user)?, dto).await?;
    Ok((StatusCode::CREATED, Json(enrollment)))
}

#[utoipa::path(
    get,
    path = "/api/enrollments/{id}",
    params(("id" = EnrollmentId, Path, description = "Enrollment record ID")),
    responses(
        (status = 200, description = "Enrollment", body = EnrollmentDetails),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Enrollment not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Enrollments"
)]
#[instrument(skip(state, auth_user))]
pub async fn get_enrollment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<EnrollmentId>,
) -> Result<Json<EnrollmentDetails>, AppError> {
    let enrollment = EnrollmentService::get_enrollment(&state.db, actor(&auth_user)?, id).await?;
    Ok(Json(enrollment))
}

#[utoipa::path(
    put,
    path = "/api/enrollments/{id}",
    params(("id" = EnrollmentId, Path, description = "Enrollment record ID")),
    request_body = UpdateEnrollmentDto,
    responses(
        (status = 200, description = "Enrollment updated", body = EnrollmentDetails),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Not the owner, or no longer pending", body = ErrorResponse),
        (status = 404, description = "Enrollment not found", body = ErrorResponse),
        (status = 409, description = "Already enrolled in this program for this school year", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Enrollments"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn update_enrollment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<EnrollmentId>,
    ValidatedJson(dto): ValidatedJson<UpdateEnrollmentDto>,
) -> Result<Json<EnrollmentDetails>, AppError> {
    let enrollment =
        EnrollmentService::update_enrollment(&state.db, actor(&auth_user)?, id, dto).await?;
    Ok(Json(enrollment))
}

#[utoipa::path(
    delete,
    path = "/api/enrollments/{id}",
    params(("id" = EnrollmentId, Path, description = "Enrollment record ID")),
    responses(
        (status = 204, description = "Enrollment deleted"),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Not the owner, or no longer pending", body = ErrorResponse),
        (status = 404, description = "Enrollment not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Enrollments"
)]
#[instrument(skip(state, auth_user))]
pub async fn delete_enrollment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<EnrollmentId>,
) -> Result<StatusCode, AppError> {
    EnrollmentService::delete_enrollment(&state.db, actor(&auth_user)?, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/enrollments/{id}/approve",
    params(("id" = EnrollmentId, Path, description = "Enrollment record ID")),
    request_body = ApproveEnrollmentDto,
    responses(
        (status = 200, description = "Enrollment approved and student notified", body = EnrollmentDetails),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - requires enrollments:review", body = ErrorResponse),
        (status = 404, description = "Pending enrollment not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Enrollments"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn approve_enrollment(
    State(state): State<AppState>,
    RequireEnrollmentsReview(auth_user): RequireEnrollmentsReview,
    Path(id): Path<EnrollmentId>,
    ValidatedJson(dto): ValidatedJson<ApproveEnrollmentDto>,
) -> Result<Json<EnrollmentDetails>, AppError> {
    let decision = ReviewDecision::approve(dto.admin_notes);
    let enrollment =
        EnrollmentService::review_enrollment(&state.db, auth_user.user_id()?, id, decision)
            .await?;
    Ok(Json(enrollment))
}

/// Reject a pending enrollment
///
/// A blank reason is refused before anything is read or written.
#[utoipa::path(
    post,
    path = "/api/enrollments/{id}/reject",
    params(("id" = EnrollmentId, Path, description = "Enrollment record ID")),
    request_body = RejectEnrollmentDto,
    responses(
        (status = 200, description = "Enrollment rejected and student notified", body = EnrollmentDetails),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - requires enrollments:review", body = ErrorResponse),
        (status = 404, description = "Pending enrollment not found", body = ErrorResponse),
        (status = 422, description = "Reason missing or blank", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Enrollments"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn reject_enrollment(
    State(state): State<AppState>,
    RequireEnrollmentsReview(auth_user): RequireEnrollmentsReview,
    Path(id): Path<EnrollmentId>,
    ValidatedJson(dto): ValidatedJson<RejectEnrollmentDto>,
) -> Result<Json<EnrollmentDetails>, AppError> {
    let decision = ReviewDecision::reject(&dto.reason).map_err(WorkflowError::into_app_error)?;
    let enrollment =
        EnrollmentService::review_enrollment(&state.db, auth_user.user_id()?, id, decision)
            .await?;
    Ok(Json(enrollment))
}
