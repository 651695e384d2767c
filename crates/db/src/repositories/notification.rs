//! Notification repository.

use std::sync::Arc;

use crate::entities::{Notification, notification};
use ripple_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};

/// Notification repository for database operations.
#[derive(Clone)]
pub struct NotificationRepository {
    db: Arc<DatabaseConnection>,
}

impl NotificationRepository {
    /// Create a new notification repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a notification by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<notification::Model>> {
        Notification::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a notification on the given connection (pool or transaction).
    pub async fn create<C: ConnectionTrait>(
        &self,
        conn: &C,
        model: notification::ActiveModel,
    ) -> AppResult<notification::Model> {
        model
            .insert(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get notifications for a user, unread first then newest first (paginated).
    pub async fn find_by_recipient(
        &self,
        user_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<notification::Model>> {
        Notification::find()
            .filter(notification::Column::RecipientId.eq(user_id))
            .order_by_asc(notification::Column::IsRead)
            .order_by_desc(notification::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count all notifications for a user.
    pub async fn count_for_recipient(&self, user_id: &str) -> AppResult<u64> {
        Notification::find()
            .filter(notification::Column::RecipientId.eq(user_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count unread notifications for a user.
    pub async fn count_unread(&self, user_id: &str) -> AppResult<u64> {
        Notification::find()
            .filter(notification::Column::RecipientId.eq(user_id))
            .filter(notification::Column::IsRead.eq(false))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Mark a notification as read.
    pub async fn mark_as_read(&self, model: notification::Model) -> AppResult<notification::Model> {
        if model.is_read {
            return Ok(model);
        }

        let mut active: notification::ActiveModel = model.into();
        active.is_read = Set(true);
        active
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Mark all notifications as read for a user. Returns the number updated.
    pub async fn mark_all_as_read(&self, user_id: &str) -> AppResult<u64> {
        let result = Notification::update_many()
            .filter(notification::Column::RecipientId.eq(user_id))
            .filter(notification::Column::IsRead.eq(false))
            .col_expr(notification::Column::IsRead, true.into())
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entities::notification::TargetKind;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_notification(id: &str, recipient: &str, actor: &str) -> notification::Model {
        notification::Model {
            id: id.to_string(),
            recipient_id: recipient.to_string(),
            actor_id: actor.to_string(),
            verb: "liked your post".to_string(),
            target_kind: Some(TargetKind::Post),
            target_id: Some("post1".to_string()),
            metadata: None,
            is_read: false,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_by_recipient() {
        let n1 = create_test_notification("n1", "user1", "user2");
        let n2 = create_test_notification("n2", "user1", "user3");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[n1, n2]])
                .into_connection(),
        );

        let repo = NotificationRepository::new(db);
        let result = repo.find_by_recipient("user1", 10, 0).await.unwrap();

        assert_eq!(result.len(), 2);
    }

    #[tokio::test]
    async fn test_mark_as_read_is_idempotent() {
        // Already-read notifications are returned without touching the DB.
        let mut read = create_test_notification("n1", "user1", "user2");
        read.is_read = true;

        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let repo = NotificationRepository::new(db);

        let result = repo.mark_as_read(read).await.unwrap();
        assert!(result.is_read);
    }

    #[tokio::test]
    async fn test_mark_all_as_read_returns_count() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 3,
                }])
                .into_connection(),
        );

        let repo = NotificationRepository::new(db);
        let count = repo.mark_all_as_read("user1").await.unwrap();

        assert_eq!(count, 3);
    }
}
