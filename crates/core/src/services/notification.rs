//! Notification service.

use ripple_common::{AppError, AppResult, IdGenerator};
use ripple_db::{
    entities::notification::{self, TargetKind},
    repositories::NotificationRepository,
};
use sea_orm::{ConnectionTrait, Set};

/// Notification service for business logic.
#[derive(Clone)]
pub struct NotificationService {
    notification_repo: NotificationRepository,
    id_gen: IdGenerator,
}

/// A page of notifications with auxiliary counts.
pub struct NotificationList {
    pub notifications: Vec<notification::Model>,
    pub total: u64,
    pub unread_count: u64,
}

impl NotificationService {
    /// Create a new notification service.
    #[must_use]
    pub const fn new(notification_repo: NotificationRepository) -> Self {
        Self {
            notification_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Record a notification on the given connection.
    ///
    /// Callers pass the transaction of the mutation that caused the
    /// notification, so a failed mutation never leaves an orphaned record.
    /// Returns `None` without writing when recipient and actor are the same
    /// user.
    pub async fn notify<C: ConnectionTrait>(
        &self,
        conn: &C,
        recipient_id: &str,
        actor_id: &str,
        verb: &str,
        target: Option<(TargetKind, &str)>,
        metadata: Option<serde_json::Value>,
    ) -> AppResult<Option<notification::Model>> {
        if recipient_id == actor_id {
            return Ok(None);
        }

        let (target_kind, target_id) = match target {
            Some((kind, id)) => (Some(kind), Some(id.to_string())),
            None => (None, None),
        };

        let model = notification::ActiveModel {
            id: Set(self.id_gen.generate()),
            recipient_id: Set(recipient_id.to_string()),
            actor_id: Set(actor_id.to_string()),
            verb: Set(verb.to_string()),
            target_kind: Set(target_kind),
            target_id: Set(target_id),
            metadata: Set(metadata),
            is_read: Set(false),
            created_at: Set(chrono::Utc::now().into()),
        };

        let created = self.notification_repo.create(conn, model).await?;
        tracing::debug!(
            recipient_id = %recipient_id,
            actor_id = %actor_id,
            verb = %verb,
            "Created notification"
        );

        Ok(Some(created))
    }

    /// Get notifications for a user, unread first then newest first.
    pub async fn list_for(
        &self,
        user_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<NotificationList> {
        let notifications = self
            .notification_repo
            .find_by_recipient(user_id, limit, offset)
            .await?;
        let total = self.notification_repo.count_for_recipient(user_id).await?;
        let unread_count = self.notification_repo.count_unread(user_id).await?;

        Ok(NotificationList {
            notifications,
            total,
            unread_count,
        })
    }

    /// Mark a notification as read.
    ///
    /// Fails with `NotFound` when the notification does not exist or belongs
    /// to someone else; marking an already-read notification is a no-op.
    pub async fn mark_read(
        &self,
        user_id: &str,
        notification_id: &str,
    ) -> AppResult<notification::Model> {
        let notification = self
            .notification_repo
            .find_by_id(notification_id)
            .await?
            .filter(|n| n.recipient_id == user_id)
            .ok_or_else(|| AppError::NotFound(format!("Notification {notification_id}")))?;

        self.notification_repo.mark_as_read(notification).await
    }

    /// Mark all notifications as read for a user. Returns the number updated.
    pub async fn mark_all_read(&self, user_id: &str) -> AppResult<u64> {
        self.notification_repo.mark_all_as_read(user_id).await
    }

    /// Count unread notifications for a user.
    pub async fn count_unread(&self, user_id: &str) -> AppResult<u64> {
        self.notification_repo.count_unread(user_id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn create_test_notification(id: &str, recipient: &str) -> notification::Model {
        notification::Model {
            id: id.to_string(),
            recipient_id: recipient.to_string(),
            actor_id: "actor1".to_string(),
            verb: "liked your post".to_string(),
            target_kind: Some(TargetKind::Post),
            target_id: Some("post1".to_string()),
            metadata: None,
            is_read: false,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_notify_skips_self_notification() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = NotificationService::new(NotificationRepository::new(Arc::clone(&db)));

        let result = service
            .notify(db.as_ref(), "user1", "user1", "liked your post", None, None)
            .await
            .unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_notify_records_target_pair() {
        let created = create_test_notification("n1", "user2");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[created]])
                .into_connection(),
        );
        let service = NotificationService::new(NotificationRepository::new(Arc::clone(&db)));

        let result = service
            .notify(
                db.as_ref(),
                "user2",
                "actor1",
                "liked your post",
                Some((TargetKind::Post, "post1")),
                None,
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(result.target_kind, Some(TargetKind::Post));
        assert_eq!(result.target_id.as_deref(), Some("post1"));
    }

    #[tokio::test]
    async fn test_mark_read_rejects_foreign_notification() {
        let notification = create_test_notification("n1", "owner");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[notification]])
                .into_connection(),
        );
        let service = NotificationService::new(NotificationRepository::new(db));

        let result = service.mark_read("intruder", "n1").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_mark_read_missing_notification() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<notification::Model>::new()])
                .into_connection(),
        );
        let service = NotificationService::new(NotificationRepository::new(db));

        let result = service.mark_read("user1", "ghost").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
