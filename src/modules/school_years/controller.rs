use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use registrar_core::AppError;
use registrar_models::SchoolYearId;
use registrar_models::school_years::{
    CreateSchoolYearDto, SchoolYearFilterParams, SchoolYearResponse, UpdateSchoolYearDto,
};
use tracing::instrument;

use super::service::SchoolYearService;
use crate::middleware::auth::{RequireSchoolYearsManage, RequireSchoolYearsRead};
use crate::modules::auth::controller::ErrorResponse;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    get,
    path = "/api/school-years",
    params(SchoolYearFilterParams),
    responses(
        (status = 200, description = "School years, newest first", body = Vec<SchoolYearResponse>),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "School Years"
)]
#[instrument(skip(state))]
pub async fn list_school_years(
    State(state): State<AppState>,
    RequireSchoolYearsRead(_auth_user): RequireSchoolYearsRead,
    Query(filters): Query<SchoolYearFilterParams>,
) -> Result<Json<Vec<SchoolYearResponse>>, AppError> {
    let school_years = SchoolYearService::list_school_years(&state.db, &filters).await?;
    Ok(Json(school_years.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/api/school-years",
    request_body = CreateSchoolYearDto,
    responses(
        (status = 201, description = "School year created", body = SchoolYearResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - requires school_years:manage", body = ErrorResponse),
        (status = 409, description = "Term already exists", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "School Years"
)]
#[instrument(skip(state, dto))]
pub async fn create_school_year(
    State(state): State<AppState>,
    RequireSchoolYearsManage(_auth_user): RequireSchoolYearsManage,
    ValidatedJson(dto): ValidatedJson<CreateSchoolYearDto>,
) -> Result<(StatusCode, Json<SchoolYearResponse>), AppError> {
    let school_year = SchoolYearService::create_school_year(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(school_year.into())))
}

#[utoipa::path(
    get,
    path = "/api/school-years/{id}",
    params(("id" = SchoolYearId, Path, description = "School year ID")),
    responses(
        (status = 200, description = "School year", body = SchoolYearResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "School year not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "School Years"
)]
#[instrument(skip(state))]
pub async fn get_school_year(
    State(state): State<AppState>,
    RequireSchoolYearsRead(_auth_user): RequireSchoolYearsRead,
    Path(id): Path<SchoolYearId>,
) -> Result<Json<SchoolYearResponse>, AppError> {
    let school_year = SchoolYearService::get_school_year(&state.db, id).await?;
    Ok(Json(school_year.into()))
}

#[utoipa::path(
    put,
    path = "/api/school-years/{id}",
    params(("id" = SchoolYearId, Path, description = "School year ID")),
    request_body = UpdateSchoolYearDto,
    responses(
        (status = 200, description = "School year updated", body = SchoolYearResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - requires school_years:manage", body = ErrorResponse),
        (status = 404, description = "School year not found", body = ErrorResponse),
        (status = 409, description = "Term already exists", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "School Years"
)]
#[instrument(skip(state, dto))]
pub async fn update_school_year(
    State(state): State<AppState>,
    RequireSchoolYearsManage(_auth_user): RequireSchoolYearsManage,
    Path(id): Path<SchoolYearId>,
    ValidatedJson(dto): ValidatedJson<UpdateSchoolYearDto>,
) -> Result<Json<SchoolYearResponse>, AppError> {
    let school_year = SchoolYearService::update_school_year(&state.db, id, dto).await?;
    Ok(Json(school_year.into()))
}

#[utoipa::path(
    delete,
    path = "/api/school-years/{id}",
    params(("id" = SchoolYearId, Path, description = "School year ID")),
    responses(
        (status = 204, description = "School year and its enrollments deleted"),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - requires school_years:manage", body = ErrorResponse),
        (status = 404, description = "School year not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "School Years"
)]
#[instrument(skip(state))]
pub async fn delete_school_year(
    State(state): State<AppState>,
    RequireSchoolYearsManage(_auth_user): RequireSchoolYearsManage,
    Path(id): Path<SchoolYearId>,
) -> Result<StatusCode, AppError> {
    SchoolYearService::delete_school_year(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
