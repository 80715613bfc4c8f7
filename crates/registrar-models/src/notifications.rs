//! Per-user notifications, newest first. Only `is_read` ever changes.

use crate::ids::{EnrollmentId, NotificationId, UserId};
use chrono::{DateTime, Utc};
use registrar_core::serde::deserialize_optional_bool;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "notification_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    EnrollmentApproved,
    EnrollmentRejected,
    EnrollmentConfirmed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Notification {
    pub id: NotificationId,
    pub user_id: UserId,
    pub enrollment_id: EnrollmentId,
    pub notification_type: NotificationType,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
pub struct NotificationFilterParams {
    #[serde(default, deserialize_with = "deserialize_optional_bool")]
    pub unread_only: Option<bool>,
    /// Mark every notification of the caller as read before listing
    #[serde(default, deserialize_with = "deserialize_optional_bool")]
    pub mark_read: Option<bool>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct NotificationListResponse {
    pub notifications: Vec<Notification>,
    pub unread_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MarkReadResponse {
    pub updated: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_wire_format() {
        assert_eq!(
            serde_json::to_string(&NotificationType::EnrollmentApproved).unwrap(),
            r#""enrollment_approved""#
        );
        let t: NotificationType = serde_json::from_str(r#""enrollment_confirmed""#).unwrap();
        assert_eq!(t, NotificationType::EnrollmentConfirmed);
    }

    #[test]
    fn test_filter_params() {
        let params: NotificationFilterParams =
            serde_json::from_str(r#"{"unread_only":"true","mark_read":""}"#).unwrap();
        assert_eq!(params.unread_only, Some(true));
        assert!(params.mark_read.is_none());
    }
}
