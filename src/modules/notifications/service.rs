use anyhow::{Context, anyhow};
use registrar_core::AppError;
use registrar_models::notifications::NotificationFilterParams;
use registrar_models::{EnrollmentId, Notification, NotificationId, NotificationType, UserId};
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use tracing::{info, instrument};

const NOTIFICATION_COLUMNS: &str =
    "id, user_id, enrollment_id, notification_type, message, is_read, created_at";

pub struct NotificationService;

impl NotificationService {
    /// Runs on the caller's connection so the notification commits or rolls
    /// back with the status change that caused it.
    #[instrument(skip(conn, message))]
    pub async fn create(
        conn: &mut PgConnection,
        user_id: UserId,
        enrollment_id: EnrollmentId,
        notification_type: NotificationType,
        message: &str,
    ) -> Result<Notification, AppError> {
        let notification = sqlx::query_as::<_, Notification>(&format!(
            r#"
            INSERT INTO notifications (id, user_id, enrollment_id, notification_type, message)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {NOTIFICATION_COLUMNS}
            "#
        ))
        .bind(NotificationId::new())
        .bind(user_id)
        .bind(enrollment_id)
        .bind(notification_type)
        .bind(message)
        .fetch_one(conn)
        .await
        .context("Failed to create notification")
        .map_err(AppError::database)?;

        Ok(notification)
    }

    #[instrument(skip(db))]
    pub async fn list_for_user(
        db: &PgPool,
        user_id: UserId,
        filters: &NotificationFilterParams,
    ) -> Result<Vec<Notification>, AppError> {
        let mut query = QueryBuilder::<Postgres>::new(format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications WHERE user_id = "
        ));
        query.push_bind(user_id);

        if filters.unread_only.unwrap_or(false) {
            query.push(" AND NOT is_read");
        }

        query.push(" ORDER BY created_at DESC");

        let notifications = query
            .build_query_as::<Notification>()
            .fetch_all(db)
            .await
            .context("Failed to fetch notifications")
            .map_err(AppError::database)?;

        Ok(notifications)
    }

    #[instrument(skip(db))]
    pub async fn unread_count(db: &PgPool, user_id: UserId) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND NOT is_read",
        )
        .bind(user_id)
        .fetch_one(db)
        .await
        .context("Failed to count unread notifications")
        .map_err(AppError::database)?;

        Ok(count)
    }

    /// Only the owner can mark a notification; anyone else gets 404.
    #[instrument(skip(db))]
    pub async fn mark_read(
        db: &PgPool,
        user_id: UserId,
        id: NotificationId,
    ) -> Result<Notification, AppError> {
        sqlx::query_as::<_, Notification>(&format!(
            "UPDATE notifications SET is_read = TRUE WHERE id = $1 AND user_id = $2 \
             RETURNING {NOTIFICATION_COLUMNS}"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(db)
        .await
        .context("Failed to mark notification as read")
        .map_err(AppError::database)?
        .ok_or_else(|| AppError::not_found(anyhow!("Notification not found")))
    }

    #[instrument(skip(db))]
    pub async fn mark_all_read(db: &PgPool, user_id: UserId) -> Result<u64, AppError> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE WHERE user_id = $1 AND NOT is_read",
        )
        .bind(user_id)
        .execute(db)
        .await
        .context("Failed to mark notifications as read")
        .map_err(AppError::database)?;

        info!(updated = result.rows_affected(), "Notifications marked as read");
        Ok(result.rows_affected())
    }
}
