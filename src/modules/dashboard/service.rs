use anyhow::Context;
use registrar_core::AppError;
use registrar_models::dashboard::{
    AVAILABLE_PROGRAMS, RECENT_ENROLLMENTS, StaffDashboard, StudentDashboard,
};
use registrar_models::{EnrollmentScope, EnrollmentStatus, UserId};
use sqlx::PgPool;
use tracing::instrument;

use crate::modules::enrollments::service::EnrollmentService;
use crate::modules::notifications::service::NotificationService;
use crate::modules::programs::service::ProgramService;
use crate::modules::students::service::StudentService;

fn count_of(counts: &[(EnrollmentStatus, i64)], status: EnrollmentStatus) -> i64 {
    counts
        .iter()
        .find(|(s, _)| *s == status)
        .map_or(0, |(_, n)| *n)
}

pub struct DashboardService;

impl DashboardService {
    #[instrument(skip(db))]
    pub async fn staff_dashboard(db: &PgPool, user_id: UserId) -> Result<StaffDashboard, AppError> {
        let (total_students, active_programs) = sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT (SELECT COUNT(*) FROM students),
                   (SELECT COUNT(*) FROM programs WHERE is_active)
            "#,
        )
        .fetch_one(db)
        .await
        .context("Failed to count students and programs")
        .map_err(AppError::database)?;

        let counts = EnrollmentService::count_by_status(db, None).await?;
        let recent_pending = EnrollmentService::recent_enrollments(
            db,
            EnrollmentScope::All,
            Some(EnrollmentStatus::Pending),
            RECENT_ENROLLMENTS,
        )
        .await?;

        Ok(StaffDashboard {
            total_students,
            active_programs,
            pending_enrollments: count_of(&counts, EnrollmentStatus::Pending),
            approved_enrollments: count_of(&counts, EnrollmentStatus::Approved),
            recent_pending,
            unread_notifications: NotificationService::unread_count(db, user_id).await?,
            profile: StudentService::find_by_user(db, user_id).await?,
        })
    }

    /// Counts and recent enrollments cover only the caller's own profile;
    /// without a profile they are empty.
    #[instrument(skip(db))]
    pub async fn student_dashboard(
        db: &PgPool,
        user_id: UserId,
    ) -> Result<StudentDashboard, AppError> {
        let profile = StudentService::find_by_user(db, user_id).await?;

        let (counts, recent_enrollments) = match &profile {
            Some(student) => (
                EnrollmentService::count_by_status(db, Some(student.id)).await?,
                EnrollmentService::recent_enrollments(
                    db,
                    EnrollmentScope::Student(student.id),
                    None,
                    RECENT_ENROLLMENTS,
                )
                .await?,
            ),
            None => (Vec::new(), Vec::new()),
        };

        Ok(StudentDashboard {
            pending_count: count_of(&counts, EnrollmentStatus::Pending),
            approved_count: count_of(&counts, EnrollmentStatus::Approved),
            enrolled_count: count_of(&counts, EnrollmentStatus::Enrolled),
            recent_enrollments,
            available_programs: ProgramService::list_active_programs(db, AVAILABLE_PROGRAMS)
                .await?,
            unread_notifications: NotificationService::unread_count(db, user_id).await?,
            profile,
        })
    }
}
