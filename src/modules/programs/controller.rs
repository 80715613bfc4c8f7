use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use registrar_core::AppError;
use registrar_models::programs::{
    CreateProgramDto, ProgramFilterParams, ProgramWithStats, UpdateProgramDto,
};
use registrar_models::{Program, ProgramId};
use tracing::instrument;

use super::service::ProgramService;
use crate::middleware::auth::{RequireProgramsManage, RequireProgramsRead};
use crate::modules::auth::controller::ErrorResponse;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    get,
    path = "/api/programs",
    params(ProgramFilterParams),
    responses(
        (status = 200, description = "Programs ordered by name", body = Vec<Program>),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Programs"
)]
#[instrument(skip(state))]
pub async fn list_programs(
    State(state): State<AppState>,
    RequireProgramsRead(_auth_user): RequireProgramsRead,
    Query(filters): Query<ProgramFilterParams>,
) -> Result<Json<Vec<Program>>, AppError> {
    let programs = ProgramService::list_programs(&state.db, &filters).await?;
    Ok(Json(programs))
}

#[utoipa::path(
    post,
    path = "/api/programs",
    request_body = CreateProgramDto,
    responses(
        (status = 201, description = "Program created", body = Program),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - requires programs:manage", body = ErrorResponse),
        (status = 409, description = "Program code already exists", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Programs"
)]
#[instrument(skip(state, dto))]
pub async fn create_program(
    State(state): State<AppState>,
    RequireProgramsManage(_auth_user): RequireProgramsManage,
    ValidatedJson(dto): ValidatedJson<CreateProgramDto>,
) -> Result<(StatusCode, Json<Program>), AppError> {
    let program = ProgramService::create_program(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(program)))
}

#[utoipa::path(
    get,
    path = "/api/programs/{id}",
    params(("id" = ProgramId, Path, description = "Program ID")),
    responses(
        (status = 200, description = "Program with its enrollment count", body = ProgramWithStats),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Program not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Programs"
)]
#[instrument(skip(state))]
pub async fn get_program(
    State(state): State<AppState>,
    RequireProgramsRead(_auth_user): RequireProgramsRead,
    Path(id): Path<ProgramId>,
) -> Result<Json<ProgramWithStats>, AppError> {
    let program = ProgramService::get_program_with_stats(&state.db, id).await?;
    Ok(Json(program))
}

#[utoipa::path(
    put,
    path = "/api/programs/{id}",
    params(("id" = ProgramId, Path, description = "Program ID")),
    request_body = UpdateProgramDto,
    responses(
        (status = 200, description = "Program updated", body = Program),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - requires programs:manage", body = ErrorResponse),
        (status = 404, description = "Program not found", body = ErrorResponse),
        (status = 409, description = "Program code already exists", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Programs"
)]
#[instrument(skip(state, dto))]
pub async fn update_program(
    State(state): State<AppState>,
    RequireProgramsManage(_auth_user): RequireProgramsManage,
    Path(id): Path<ProgramId>,
    ValidatedJson(dto): ValidatedJson<UpdateProgramDto>,
) -> Result<Json<Program>, AppError> {
    let program = ProgramService::update_program(&state.db, id, dto).await?;
    Ok(Json(program))
}

#[utoipa::path(
    delete,
    path = "/api/programs/{id}",
    params(("id" = ProgramId, Path, description = "Program ID")),
    responses(
        (status = 204, description = "Program and its enrollments deleted"),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - requires programs:manage", body = ErrorResponse),
        (status = 404, description = "Program not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Programs"
)]
#[instrument(skip(state))]
pub async fn delete_program(
    State(state): State<AppState>,
    RequireProgramsManage(_auth_user): RequireProgramsManage,
    Path(id): Path<ProgramId>,
) -> Result<StatusCode, AppError> {
    ProgramService::delete_program(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
