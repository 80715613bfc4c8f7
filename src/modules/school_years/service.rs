use anyhow::{Context, anyhow};
use registrar_core::AppError;
use registrar_models::school_years::{
    CreateSchoolYearDto, SchoolYearFilterParams, UpdateSchoolYearDto,
};
use registrar_models::{SchoolYear, SchoolYearId};
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{info, instrument};

use crate::utils::db_errors::map_write_error;

pub(crate) const SCHOOL_YEAR_COLUMNS: &str = "id, year_start, year_end, semester, is_active, \
    enrollment_start, enrollment_end, created_at";

pub struct SchoolYearService;

impl SchoolYearService {
    #[instrument(skip(db))]
    pub async fn list_school_years(
        db: &PgPool,
        filters: &SchoolYearFilterParams,
    ) -> Result<Vec<SchoolYear>, AppError> {
        let mut query = QueryBuilder::<Postgres>::new(format!(
            "SELECT {SCHOOL_YEAR_COLUMNS} FROM school_years WHERE TRUE"
        ));

        if let Some(is_active) = filters.is_active {
            query.push(" AND is_active = ").push_bind(is_active);
        }

        if let Some(semester) = filters.semester {
            query.push(" AND semester = ").push_bind(semester);
        }

        query.push(" ORDER BY year_start DESC, year_end DESC, semester");

        let school_years = query
            .build_query_as::<SchoolYear>()
            .fetch_all(db)
            .await
            .context("Failed to fetch school years")
            .map_err(AppError::database)?;

        Ok(school_years)
    }

    #[instrument(skip(db))]
    pub async fn get_school_year(db: &PgPool, id: SchoolYearId) -> Result<SchoolYear, AppError> {
        sqlx::query_as::<_, SchoolYear>(&format!(
            "SELECT {SCHOOL_YEAR_COLUMNS} FROM school_years WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await
        .context("Failed to fetch school year")
        .map_err(AppError::database)?
        .ok_or_else(|| AppError::not_found(anyhow!("School year not found")))
    }

    #[instrument(skip(db, dto))]
    pub async fn create_school_year(
        db: &PgPool,
        dto: CreateSchoolYearDto,
    ) -> Result<SchoolYear, AppError> {
        let school_year = sqlx::query_as::<_, SchoolYear>(&format!(
            r#"
            INSERT INTO school_years (id, year_start, year_end, semester, is_active,
                enrollment_start, enrollment_end)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {SCHOOL_YEAR_COLUMNS}
            "#
        ))
        .bind(SchoolYearId::new())
        .bind(dto.year_start)
        .bind(dto.year_end)
        .bind(dto.semester)
        .bind(dto.is_active)
        .bind(dto.enrollment_start)
        .bind(dto.enrollment_end)
        .fetch_one(db)
        .await
        .map_err(|e| map_write_error(e, "Failed to create school year"))?;

        info!(school_year_id = %school_year.id, label = %school_year.label(), "School year created");
        Ok(school_year)
    }

    /// Partial update; the date rules are checked against the merged record.
    #[instrument(skip(db, dto))]
    pub async fn update_school_year(
        db: &PgPool,
        id: SchoolYearId,
        dto: UpdateSchoolYearDto,
    ) -> Result<SchoolYear, AppError> {
        let existing = Self::get_school_year(db, id).await?;
        dto.merged_dates_check(&existing)
            .map_err(|msg| AppError::unprocessable(anyhow!(msg)))?;

        let school_year = sqlx::query_as::<_, SchoolYear>(&format!(
            r#"
            UPDATE school_years
            SET year_start = $1, year_end = $2, semester = $3, is_active = $4,
                enrollment_start = $5, enrollment_end = $6
            WHERE id = $7
            RETURNING {SCHOOL_YEAR_COLUMNS}
            "#
        ))
        .bind(dto.year_start.unwrap_or(existing.year_start))
        .bind(dto.year_end.unwrap_or(existing.year_end))
        .bind(dto.semester.unwrap_or(existing.semester))
        .bind(dto.is_active.unwrap_or(existing.is_active))
        .bind(dto.enrollment_start.unwrap_or(existing.enrollment_start))
        .bind(dto.enrollment_end.unwrap_or(existing.enrollment_end))
        .bind(id)
        .fetch_optional(db)
        .await
        .map_err(|e| map_write_error(e, "Failed to update school year"))?
        .ok_or_else(|| AppError::not_found(anyhow!("School year not found")))?;

        info!(school_year_id = %school_year.id, "School year updated");
        Ok(school_year)
    }

    /// Deleting a school year cascades to its enrollments.
    #[instrument(skip(db))]
    pub async fn delete_school_year(db: &PgPool, id: SchoolYearId) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM school_years WHERE id = $1")
            .bind(id)
            .execute(db)
            .await
            .context("Failed to delete school year")
            .map_err(AppError::database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("School year not found")));
        }

        info!(school_year_id = %id, "School year deleted");
        Ok(())
    }
}
