use anyhow::{Context, anyhow};
use chrono::{Datelike, Utc};
use registrar_core::AppError;
use registrar_models::enrollments::{
    CreateCapabilities, CreateEnrollmentDto, EnrollmentFilterParams, ReviewDecision,
    UpdateEnrollmentDto, confirmation_message,
};
use registrar_models::identifiers::{
    enrollment_id_pattern, format_enrollment_id, parse_enrollment_id,
};
use registrar_models::{
    EnrollmentAccess, EnrollmentDetails, EnrollmentId, EnrollmentScope, EnrollmentStatus, IdError,
    NotificationType, Program, ProgramId, SchoolYear, SchoolYearId, StudentId, UserId,
    WorkflowError,
};
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use tracing::{info, instrument, warn};

use crate::metrics;
use crate::modules::notifications::service::NotificationService;
use crate::modules::programs::service::ProgramService;
use crate::modules::school_years::service::SchoolYearService;
use crate::modules::students::service::StudentService;
use crate::utils::db_errors::map_write_error;
use crate::utils::query::contains_pattern;

const DETAILS_SELECT: &str = r#"
    SELECT e.id, e.enrollment_id, e.student_id,
        s.student_id AS student_number,
        CONCAT_WS(' ', s.first_name, NULLIF(s.middle_name, ''), s.last_name) AS student_name,
        s.user_id AS student_user_id,
        e.program_id, p.code AS program_code, p.name AS program_name,
        e.school_year_id, sy.year_start AS school_year_start, sy.year_end AS school_year_end,
        sy.semester,
        e.year_level, e.status, e.total_fee_cents,
        e.reviewed_by, r.username AS reviewer_username, e.reviewed_at, e.admin_notes,
        e.created_at, e.updated_at
    FROM enrollments e
    JOIN students s ON s.id = e.student_id
    JOIN programs p ON p.id = e.program_id
    JOIN school_years sy ON sy.id = e.school_year_id
    LEFT JOIN users r ON r.id = e.reviewed_by
"#;

/// Increments the per-year counter and returns the new value. The first call
/// in a year seeds the row from the highest existing ID for that year. The
/// row lock is held until the surrounding transaction ends, so concurrent
/// creators are serialized and a rolled-back creation releases its number.
const NEXT_SEQUENCE: &str = r#"
    INSERT INTO enrollment_sequences (year, last_value)
    SELECT $1, COALESCE(MAX(CAST(SUBSTRING(enrollment_id FROM 10) AS INTEGER)), 0) + 1
    FROM enrollments
    WHERE enrollment_id LIKE $2
    ON CONFLICT (year) DO UPDATE SET last_value = enrollment_sequences.last_value + 1
    RETURNING last_value
"#;

/// Reads the columns a write decides on and locks the row until the
/// surrounding transaction ends, so a concurrent review cannot change the
/// status between the permission check and the write.
const LOCK_ENROLLMENT: &str = r#"
    SELECT e.enrollment_id, e.status, s.user_id AS student_user_id,
        e.program_id, p.name AS program_name, e.school_year_id,
        e.year_level, e.total_fee_cents
    FROM enrollments e
    JOIN students s ON s.id = e.student_id
    JOIN programs p ON p.id = e.program_id
    WHERE e.id = $1
    FOR UPDATE OF e
"#;

/// What the caller may do with enrollments, read off the access token.
#[derive(Debug, Clone, Copy)]
pub struct Actor {
    pub user_id: UserId,
    pub can_read_all: bool,
    pub can_manage_all: bool,
    pub can_review: bool,
}

impl Actor {
    fn access(&self, student_user_id: UserId) -> EnrollmentAccess {
        EnrollmentAccess {
            can_read_all: self.can_read_all,
            can_manage_all: self.can_manage_all,
            is_owner: student_user_id == self.user_id,
        }
    }
}

#[derive(sqlx::FromRow)]
struct LockedEnrollment {
    enrollment_id: String,
    status: EnrollmentStatus,
    student_user_id: UserId,
    program_id: ProgramId,
    program_name: String,
    school_year_id: SchoolYearId,
    year_level: i16,
    total_fee_cents: i64,
}

pub struct EnrollmentService;

impl EnrollmentService {
    /// Allocates the next `ENR-YYYY-NNNNN` ID on `conn`, which must be inside
    /// the transaction that inserts the enrollment.
    pub(crate) async fn next_enrollment_id(
        conn: &mut PgConnection,
        year: i32,
    ) -> Result<String, AppError> {
        let n = sqlx::query_scalar::<_, i32>(NEXT_SEQUENCE)
            .bind(year)
            .bind(enrollment_id_pattern(year))
            .fetch_one(conn)
            .await
            .context("Failed to allocate enrollment ID")
            .map_err(AppError::database)?;

        format_enrollment_id(year, n).map_err(|err| {
            warn!(year, n, "Enrollment ID sequence exhausted");
            IdError::into_app_error(err)
        })
    }

    #[instrument(skip(db))]
    pub async fn list_enrollments(
        db: &PgPool,
        scope: EnrollmentScope,
        filters: &EnrollmentFilterParams,
    ) -> Result<Vec<EnrollmentDetails>, AppError> {
        Self::query_details(db, scope, filters, None).await
    }

    /// Newest enrollments in `scope`, optionally restricted to one status.
    #[instrument(skip(db))]
    pub async fn recent_enrollments(
        db: &PgPool,
        scope: EnrollmentScope,
        status: Option<EnrollmentStatus>,
        limit: i64,
    ) -> Result<Vec<EnrollmentDetails>, AppError> {
        let filters = EnrollmentFilterParams {
            status,
            ..Default::default()
        };
        Self::query_details(db, scope, &filters, Some(limit)).await
    }

    async fn query_details(
        db: &PgPool,
        scope: EnrollmentScope,
        filters: &EnrollmentFilterParams,
        limit: Option<i64>,
    ) -> Result<Vec<EnrollmentDetails>, AppError> {
        let mut query = QueryBuilder::<Postgres>::new(DETAILS_SELECT);
        query.push(" WHERE TRUE");

        match scope {
            EnrollmentScope::All => {}
            EnrollmentScope::Student(student_id) => {
                query.push(" AND e.student_id = ").push_bind(student_id);
            }
            EnrollmentScope::Nothing => return Ok(Vec::new()),
        }

        if let Some(status) = filters.status {
            query.push(" AND e.status = ").push_bind(status);
        }

        if let Some(school_year_id) = filters.school_year_id {
            query.push(" AND e.school_year_id = ").push_bind(school_year_id);
        }

        if let Some(search) = &filters.search {
            let candidate = search.trim().to_uppercase();
            if parse_enrollment_id(&candidate).is_ok() {
                // A complete enrollment ID names exactly one row.
                query.push(" AND e.enrollment_id = ").push_bind(candidate);
            } else {
                Self::push_search(&mut query, search);
            }
        }

        query.push(" ORDER BY e.created_at DESC, e.enrollment_id DESC");

        if let Some(limit) = limit {
            query.push(" LIMIT ").push_bind(limit);
        }

        let enrollments = query
            .build_query_as::<EnrollmentDetails>()
            .fetch_all(db)
            .await
            .context("Failed to fetch enrollments")
            .map_err(AppError::database)?;

        Ok(enrollments)
    }

    /// Case-insensitive substring match across the listed columns.
    fn push_search(query: &mut QueryBuilder<'_, Postgres>, search: &str) {
        let pattern = contains_pattern(search);
        query.push(" AND (");
        let mut fields = query.separated(" OR ");
        for column in [
            "e.enrollment_id",
            "s.first_name",
            "s.last_name",
            "s.student_id",
            "p.code",
            "p.name",
        ] {
            fields
                .push(format!("{column} ILIKE "))
                .push_bind_unseparated(pattern.clone());
        }
        query.push(")");
    }

    #[instrument(skip(db))]
    pub async fn get_details(db: &PgPool, id: EnrollmentId) -> Result<EnrollmentDetails, AppError> {
        sqlx::query_as::<_, EnrollmentDetails>(&format!("{DETAILS_SELECT} WHERE e.id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await
            .context("Failed to fetch enrollment")
            .map_err(AppError::database)?
            .ok_or_else(|| AppError::not_found(anyhow!("Enrollment not found")))
    }

    #[instrument(skip(db))]
    pub async fn get_enrollment(
        db: &PgPool,
        actor: Actor,
        id: EnrollmentId,
    ) -> Result<EnrollmentDetails, AppError> {
        let enrollment = Self::get_details(db, id).await?;
        actor
            .access(enrollment.student_user_id)
            .check_view()
            .map_err(WorkflowError::into_app_error)?;
        Ok(enrollment)
    }

    /// Resolves whose enrollments the caller may list.
    pub async fn resolve_scope(
        db: &PgPool,
        actor: Actor,
        filters: &EnrollmentFilterParams,
    ) -> Result<EnrollmentScope, AppError> {
        let own_student = StudentService::find_by_user(db, actor.user_id)
            .await?
            .map(|s| s.id);
        Ok(EnrollmentScope::resolve(
            actor.can_read_all,
            own_student,
            filters.view,
        ))
    }

    /// Creates a `pending` enrollment, or an `approved` one when a reviewer
    /// asks for auto-approval. ID allocation and the insert share one
    /// transaction, so a failed insert does not consume a sequence number.
    #[instrument(skip(db, dto))]
    pub async fn create_enrollment(
        db: &PgPool,
        actor: Actor,
        dto: CreateEnrollmentDto,
    ) -> Result<EnrollmentDetails, AppError> {
        let own_student = StudentService::find_by_user(db, actor.user_id)
            .await?
            .map(|s| s.id);

        let plan = CreateCapabilities {
            can_manage_all: actor.can_manage_all,
            can_review: actor.can_review,
            own_student,
        }
        .plan(dto.student_id, dto.auto_approve)
        .map_err(WorkflowError::into_app_error)?;

        if Some(plan.student_id) != own_student {
            StudentService::get_student(db, plan.student_id).await?;
        }

        let program = Self::active_program(db, dto.program_id).await?;
        Self::active_school_year(db, dto.school_year_id).await?;

        let total_fee_cents = match dto.total_fee_cents {
            Some(fee) if plan.fee_override_allowed => fee,
            _ => program.tuition_fee_cents,
        };

        let (status, reviewed_by, admin_notes) = if plan.auto_approve {
            let notes = ReviewDecision::approve(dto.admin_notes)
                .admin_notes()
                .map(str::to_string);
            (EnrollmentStatus::Approved, Some(actor.user_id), notes)
        } else {
            (EnrollmentStatus::Pending, None, None)
        };

        let mut tx = db
            .begin()
            .await
            .context("Failed to begin transaction")
            .map_err(AppError::database)?;

        let enrollment_id = Self::next_enrollment_id(&mut tx, Utc::now().year()).await?;
        let id = EnrollmentId::new();

        sqlx::query(
            r#"
            INSERT INTO enrollments (id, enrollment_id, student_id, program_id, school_year_id,
                year_level, status, total_fee_cents, reviewed_by, reviewed_at, admin_notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9,
                CASE WHEN $9::uuid IS NULL THEN NULL ELSE NOW() END, $10)
            "#,
        )
        .bind(id)
        .bind(&enrollment_id)
        .bind(plan.student_id)
        .bind(dto.program_id)
        .bind(dto.school_year_id)
        .bind(dto.year_level)
        .bind(status)
        .bind(total_fee_cents)
        .bind(reviewed_by)
        .bind(admin_notes)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, "Failed to create enrollment"))?;

        if plan.auto_approve {
            let student_user_id = Self::student_user_id(&mut tx, plan.student_id).await?;
            NotificationService::create(
                &mut tx,
                student_user_id,
                id,
                NotificationType::EnrollmentConfirmed,
                &confirmation_message(&program.name),
            )
            .await?;
        }

        tx.commit()
            .await
            .context("Failed to commit enrollment")
            .map_err(AppError::database)?;

        info!(
            enrollment_id = %enrollment_id,
            status = status.as_str(),
            "Enrollment created"
        );
        metrics::track_enrollment_created(status.as_str());

        Self::get_details(db, id).await
    }

    /// Owners may edit while pending; managers at any status. Only managers
    /// may override the fee. The status is checked on the locked row, so a
    /// review that lands first is always seen.
    #[instrument(skip(db, dto))]
    pub async fn update_enrollment(
        db: &PgPool,
        actor: Actor,
        id: EnrollmentId,
        dto: UpdateEnrollmentDto,
    ) -> Result<EnrollmentDetails, AppError> {
        let mut tx = db
            .begin()
            .await
            .context("Failed to begin transaction")
            .map_err(AppError::database)?;

        let current = Self::lock_enrollment(&mut tx, id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Enrollment not found")))?;
        actor
            .access(current.student_user_id)
            .check_update(current.status)
            .map_err(WorkflowError::into_app_error)?;

        let program_id = match dto.program_id {
            Some(program_id) if program_id != current.program_id => {
                Self::active_program(db, program_id).await?.id
            }
            _ => current.program_id,
        };
        let school_year_id = match dto.school_year_id {
            Some(school_year_id) if school_year_id != current.school_year_id => {
                Self::active_school_year(db, school_year_id).await?.id
            }
            _ => current.school_year_id,
        };
        let total_fee_cents = match dto.total_fee_cents {
            Some(fee) if actor.can_manage_all => fee,
            _ => current.total_fee_cents,
        };

        sqlx::query(
            r#"
            UPDATE enrollments
            SET program_id = $1, school_year_id = $2, year_level = $3, total_fee_cents = $4,
                updated_at = NOW()
            WHERE id = $5
            "#,
        )
        .bind(program_id)
        .bind(school_year_id)
        .bind(dto.year_level.unwrap_or(current.year_level))
        .bind(total_fee_cents)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, "Failed to update enrollment"))?;

        tx.commit()
            .await
            .context("Failed to commit enrollment update")
            .map_err(AppError::database)?;

        info!(enrollment_id = %current.enrollment_id, "Enrollment updated");
        Self::get_details(db, id).await
    }

    #[instrument(skip(db))]
    pub async fn delete_enrollment(
        db: &PgPool,
        actor: Actor,
        id: EnrollmentId,
    ) -> Result<(), AppError> {
        let mut tx = db
            .begin()
            .await
            .context("Failed to begin transaction")
            .map_err(AppError::database)?;

        let current = Self::lock_enrollment(&mut tx, id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Enrollment not found")))?;
        actor
            .access(current.student_user_id)
            .check_delete(current.status)
            .map_err(WorkflowError::into_app_error)?;

        sqlx::query("DELETE FROM enrollments WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .context("Failed to delete enrollment")
            .map_err(AppError::database)?;

        tx.commit()
            .await
            .context("Failed to commit enrollment deletion")
            .map_err(AppError::database)?;

        info!(enrollment_id = %current.enrollment_id, "Enrollment deleted");
        Ok(())
    }

    /// Applies an approve or reject decision to a pending enrollment. The
    /// status change and the student's notification commit together.
    #[instrument(skip(db, decision))]
    pub async fn review_enrollment(
        db: &PgPool,
        reviewer: UserId,
        id: EnrollmentId,
        decision: ReviewDecision,
    ) -> Result<EnrollmentDetails, AppError> {
        let mut tx = db
            .begin()
            .await
            .context("Failed to begin transaction")
            .map_err(AppError::database)?;

        let target = Self::lock_enrollment(&mut tx, id)
            .await?
            .ok_or_else(|| WorkflowError::NotPending.into_app_error())?;

        let status = target
            .status
            .review(&decision)
            .map_err(WorkflowError::into_app_error)?;

        sqlx::query(
            r#"
            UPDATE enrollments
            SET status = $1, reviewed_by = $2, reviewed_at = NOW(), admin_notes = $3,
                updated_at = NOW()
            WHERE id = $4
            "#,
        )
        .bind(status)
        .bind(reviewer)
        .bind(decision.admin_notes())
        .bind(id)
        .execute(&mut *tx)
        .await
        .context("Failed to update enrollment status")
        .map_err(AppError::database)?;

        NotificationService::create(
            &mut tx,
            target.student_user_id,
            id,
            decision.notification_type(),
            &decision.notification_message(&target.program_name),
        )
        .await?;

        tx.commit()
            .await
            .context("Failed to commit review")
            .map_err(AppError::database)?;

        info!(
            enrollment_id = %target.enrollment_id,
            status = status.as_str(),
            "Enrollment reviewed"
        );
        metrics::track_enrollment_reviewed(status.as_str());

        Self::get_details(db, id).await
    }

    #[instrument(skip(db))]
    pub async fn count_by_status(
        db: &PgPool,
        student: Option<StudentId>,
    ) -> Result<Vec<(EnrollmentStatus, i64)>, AppError> {
        let counts = sqlx::query_as::<_, (EnrollmentStatus, i64)>(
            r#"
            SELECT status, COUNT(*)
            FROM enrollments
            WHERE $1::uuid IS NULL OR student_id = $1
            GROUP BY status
            "#,
        )
        .bind(student)
        .fetch_all(db)
        .await
        .context("Failed to count enrollments")
        .map_err(AppError::database)?;

        Ok(counts)
    }

    async fn lock_enrollment(
        conn: &mut PgConnection,
        id: EnrollmentId,
    ) -> Result<Option<LockedEnrollment>, AppError> {
        let row = sqlx::query_as::<_, LockedEnrollment>(LOCK_ENROLLMENT)
            .bind(id)
            .fetch_optional(conn)
            .await
            .context("Failed to lock enrollment")
            .map_err(AppError::database)?;

        Ok(row)
    }

    async fn active_program(db: &PgPool, id: ProgramId) -> Result<Program, AppError> {
        let program = ProgramService::get_program(db, id).await?;
        if !program.is_active {
            return Err(WorkflowError::InactiveProgram.into_app_error());
        }
        Ok(program)
    }

    async fn active_school_year(db: &PgPool, id: SchoolYearId) -> Result<SchoolYear, AppError> {
        let school_year = SchoolYearService::get_school_year(db, id).await?;
        if !school_year.is_active {
            return Err(WorkflowError::InactiveSchoolYear.into_app_error());
        }
        Ok(school_year)
    }

    async fn student_user_id(
        conn: &mut PgConnection,
        student_id: StudentId,
    ) -> Result<UserId, AppError> {
        sqlx::query_scalar::<_, UserId>("SELECT user_id FROM students WHERE id = $1")
            .bind(student_id)
            .fetch_optional(conn)
            .await
            .context("Failed to fetch student")
            .map_err(AppError::database)?
            .ok_or_else(|| AppError::not_found(anyhow!("Student not found")))
    }
}
