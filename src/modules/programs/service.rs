use anyhow::{Context, anyhow};
use registrar_core::AppError;
use registrar_models::programs::{
    CreateProgramDto, ProgramFilterParams, ProgramWithStats, UpdateProgramDto,
};
use registrar_models::{Program, ProgramId};
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{info, instrument};

use crate::utils::db_errors::map_write_error;
use crate::utils::query::contains_pattern;

pub(crate) const PROGRAM_COLUMNS: &str = "id, code, name, program_type, description, \
    duration_years, tuition_fee_cents, is_active, created_at, updated_at";

pub struct ProgramService;

impl ProgramService {
    #[instrument(skip(db))]
    pub async fn list_programs(
        db: &PgPool,
        filters: &ProgramFilterParams,
    ) -> Result<Vec<Program>, AppError> {
        let mut query = QueryBuilder::<Postgres>::new(format!(
            "SELECT {PROGRAM_COLUMNS} FROM programs WHERE TRUE"
        ));

        if let Some(search) = &filters.search {
            let pattern = contains_pattern(search);
            query
                .push(" AND (code ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR description ILIKE ")
                .push_bind(pattern)
                .push(")");
        }

        if let Some(program_type) = filters.program_type {
            query.push(" AND program_type = ").push_bind(program_type);
        }

        if let Some(status) = filters.status {
            query.push(" AND is_active = ").push_bind(status.is_active());
        }

        query.push(" ORDER BY name");

        let programs = query
            .build_query_as::<Program>()
            .fetch_all(db)
            .await
            .context("Failed to fetch programs")
            .map_err(AppError::database)?;

        Ok(programs)
    }

    #[instrument(skip(db))]
    pub async fn list_active_programs(db: &PgPool, limit: i64) -> Result<Vec<Program>, AppError> {
        let programs = sqlx::query_as::<_, Program>(&format!(
            "SELECT {PROGRAM_COLUMNS} FROM programs WHERE is_active ORDER BY name LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(db)
        .await
        .context("Failed to fetch active programs")
        .map_err(AppError::database)?;

        Ok(programs)
    }

    #[instrument(skip(db))]
    pub async fn get_program(db: &PgPool, id: ProgramId) -> Result<Program, AppError> {
        sqlx::query_as::<_, Program>(&format!(
            "SELECT {PROGRAM_COLUMNS} FROM programs WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await
        .context("Failed to fetch program")
        .map_err(AppError::database)?
        .ok_or_else(|| AppError::not_found(anyhow!("Program not found")))
    }

    #[instrument(skip(db))]
    pub async fn get_program_with_stats(
        db: &PgPool,
        id: ProgramId,
    ) -> Result<ProgramWithStats, AppError> {
        sqlx::query_as::<_, ProgramWithStats>(&format!(
            r#"
            SELECT {PROGRAM_COLUMNS},
                (SELECT COUNT(*) FROM enrollments e WHERE e.program_id = programs.id)
                    AS enrollment_count
            FROM programs
            WHERE id = $1
            "#
        ))
        .bind(id)
        .fetch_optional(db)
        .await
        .context("Failed to fetch program")
        .map_err(AppError::database)?
        .ok_or_else(|| AppError::not_found(anyhow!("Program not found")))
    }

    #[instrument(skip(db, dto), fields(code = %dto.code))]
    pub async fn create_program(db: &PgPool, dto: CreateProgramDto) -> Result<Program, AppError> {
        let program = sqlx::query_as::<_, Program>(&format!(
            r#"
            INSERT INTO programs (id, code, name, program_type, description, duration_years,
                tuition_fee_cents, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {PROGRAM_COLUMNS}
            "#
        ))
        .bind(ProgramId::new())
        .bind(dto.code.trim())
        .bind(dto.name.trim())
        .bind(dto.program_type)
        .bind(&dto.description)
        .bind(dto.duration_years)
        .bind(dto.tuition_fee_cents)
        .bind(dto.is_active)
        .fetch_one(db)
        .await
        .map_err(|e| map_write_error(e, "Failed to create program"))?;

        info!(program_id = %program.id, code = %program.code, "Program created");
        Ok(program)
    }

    #[instrument(skip(db, dto))]
    pub async fn update_program(
        db: &PgPool,
        id: ProgramId,
        dto: UpdateProgramDto,
    ) -> Result<Program, AppError> {
        let existing = Self::get_program(db, id).await?;

        let program = sqlx::query_as::<_, Program>(&format!(
            r#"
            UPDATE programs
            SET code = $1, name = $2, program_type = $3, description = $4,
                duration_years = $5, tuition_fee_cents = $6, is_active = $7, updated_at = NOW()
            WHERE id = $8
            RETURNING {PROGRAM_COLUMNS}
            "#
        ))
        .bind(dto.code.as_deref().map(str::trim).unwrap_or(&existing.code))
        .bind(dto.name.as_deref().map(str::trim).unwrap_or(&existing.name))
        .bind(dto.program_type.unwrap_or(existing.program_type))
        .bind(dto.description.as_deref().unwrap_or(&existing.description))
        .bind(dto.duration_years.unwrap_or(existing.duration_years))
        .bind(dto.tuition_fee_cents.unwrap_or(existing.tuition_fee_cents))
        .bind(dto.is_active.unwrap_or(existing.is_active))
        .bind(id)
        .fetch_optional(db)
        .await
        .map_err(|e| map_write_error(e, "Failed to update program"))?
        .ok_or_else(|| AppError::not_found(anyhow!("Program not found")))?;

        info!(program_id = %program.id, "Program updated");
        Ok(program)
    }

    /// Deleting a program cascades to its enrollments.
    #[instrument(skip(db))]
    pub async fn delete_program(db: &PgPool, id: ProgramId) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM programs WHERE id = $1")
            .bind(id)
            .execute(db)
            .await
            .context("Failed to delete program")
            .map_err(AppError::database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("Program not found")));
        }

        info!(program_id = %id, "Program deleted");
        Ok(())
    }
}
