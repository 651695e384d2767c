//! Follow service.

use crate::services::notification::NotificationService;
use ripple_common::{AppError, AppResult, IdGenerator};
use ripple_db::{
    entities::follow,
    repositories::{FollowRepository, UserRepository},
};
use sea_orm::{DatabaseConnection, Set, TransactionTrait};
use std::sync::Arc;

/// Result of a follow operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowOutcome {
    /// A new follow edge was created.
    Created,
    /// The edge already existed; repeating the request is a success.
    AlreadyFollowing,
}

/// Follow service for business logic.
#[derive(Clone)]
pub struct FollowService {
    db: Arc<DatabaseConnection>,
    follow_repo: FollowRepository,
    user_repo: UserRepository,
    notifier: NotificationService,
    id_gen: IdGenerator,
}

impl FollowService {
    /// Create a new follow service.
    #[must_use]
    pub fn new(
        db: Arc<DatabaseConnection>,
        follow_repo: FollowRepository,
        user_repo: UserRepository,
        notifier: NotificationService,
    ) -> Self {
        Self {
            db,
            follow_repo,
            user_repo,
            notifier,
            id_gen: IdGenerator::new(),
        }
    }

    /// Follow a user.
    ///
    /// Idempotent: the first call creates the edge and notifies the followee;
    /// repeating it is a success that changes nothing. The edge insert, the
    /// counter updates, and the notification share one transaction, with the
    /// unique (follower, followee) index arbitrating concurrent requests.
    pub async fn follow(&self, follower_id: &str, followee_id: &str) -> AppResult<FollowOutcome> {
        if follower_id == followee_id {
            return Err(AppError::Validation(
                "You cannot follow yourself".to_string(),
            ));
        }

        // 404 for an unknown target
        let followee = self.user_repo.get_by_id(followee_id).await?;

        let model = follow::ActiveModel {
            id: Set(self.id_gen.generate()),
            follower_id: Set(follower_id.to_string()),
            followee_id: Set(followee.id.clone()),
            created_at: Set(chrono::Utc::now().into()),
        };

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let created = self.follow_repo.insert_edge(&txn, model).await?;

        if created {
            self.user_repo
                .increment_following_count(&txn, follower_id)
                .await?;
            self.user_repo
                .increment_followers_count(&txn, followee_id)
                .await?;
            self.notifier
                .notify(
                    &txn,
                    followee_id,
                    follower_id,
                    "started following you",
                    None,
                    None,
                )
                .await?;
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if created {
            tracing::debug!(follower_id = %follower_id, followee_id = %followee_id, "Created follow edge");
            Ok(FollowOutcome::Created)
        } else {
            Ok(FollowOutcome::AlreadyFollowing)
        }
    }

    /// Unfollow a user.
    ///
    /// Fails with a validation error when no edge exists.
    pub async fn unfollow(&self, follower_id: &str, followee_id: &str) -> AppResult<()> {
        if follower_id == followee_id {
            return Err(AppError::Validation(
                "You cannot unfollow yourself".to_string(),
            ));
        }

        // 404 for an unknown target
        self.user_repo.get_by_id(followee_id).await?;

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let deleted = self
            .follow_repo
            .delete_edge(&txn, follower_id, followee_id)
            .await?;

        if !deleted {
            return Err(AppError::Validation(
                "You are not following this user".to_string(),
            ));
        }

        self.user_repo
            .decrement_following_count(&txn, follower_id)
            .await?;
        self.user_repo
            .decrement_followers_count(&txn, followee_id)
            .await?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::debug!(follower_id = %follower_id, followee_id = %followee_id, "Removed follow edge");
        Ok(())
    }

    /// Check if a user is following another.
    pub async fn is_following(&self, follower_id: &str, followee_id: &str) -> AppResult<bool> {
        self.follow_repo
            .is_following(follower_id, followee_id)
            .await
    }

    /// Get edges for the followers of a user (paginated).
    pub async fn followers(
        &self,
        user_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<(Vec<follow::Model>, u64)> {
        let edges = self.follow_repo.find_followers(user_id, limit, offset).await?;
        let total = self.follow_repo.count_followers(user_id).await?;
        Ok((edges, total))
    }

    /// Get edges for the users a user is following (paginated).
    pub async fn following(
        &self,
        user_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<(Vec<follow::Model>, u64)> {
        let edges = self.follow_repo.find_following(user_id, limit, offset).await?;
        let total = self.follow_repo.count_following(user_id).await?;
        Ok((edges, total))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use ripple_db::entities::user;
    use ripple_db::repositories::NotificationRepository;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_user(id: &str, username: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            username: username.to_string(),
            username_lower: username.to_lowercase(),
            token: None,
            name: None,
            bio: None,
            avatar_url: None,
            followers_count: 0,
            following_count: 0,
            posts_count: 0,
            is_admin: false,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn create_service(db: Arc<DatabaseConnection>) -> FollowService {
        let follow_repo = FollowRepository::new(Arc::clone(&db));
        let user_repo = UserRepository::new(Arc::clone(&db));
        let notifier = NotificationService::new(NotificationRepository::new(Arc::clone(&db)));
        FollowService::new(db, follow_repo, user_repo, notifier)
    }

    #[tokio::test]
    async fn test_follow_yourself_is_rejected() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = create_service(db);

        let result = service.follow("user1", "user1").await;

        match result {
            Err(AppError::Validation(msg)) => assert!(msg.contains("yourself")),
            _ => panic!("Expected Validation error"),
        }
    }

    #[tokio::test]
    async fn test_follow_unknown_user_is_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );
        let service = create_service(db);

        let result = service.follow("user1", "ghost").await;
        assert!(matches!(result, Err(AppError::UserNotFound(_))));
    }

    #[tokio::test]
    async fn test_follow_repeat_is_idempotent_success() {
        let followee = create_test_user("user2", "bob");

        // Conflict-tolerant insert affects zero rows on the second call; no
        // counters move and no notification is written.
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[followee]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );
        let service = create_service(db);

        let outcome = service.follow("user1", "user2").await.unwrap();
        assert_eq!(outcome, FollowOutcome::AlreadyFollowing);
    }

    #[tokio::test]
    async fn test_unfollow_without_follow_fails() {
        let followee = create_test_user("user2", "bob");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[followee]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );
        let service = create_service(db);

        let result = service.unfollow("user1", "user2").await;

        match result {
            Err(AppError::Validation(msg)) => assert!(msg.contains("not following")),
            _ => panic!("Expected Validation error"),
        }
    }

    #[tokio::test]
    async fn test_is_following() {
        let edge = follow::Model {
            id: "f1".to_string(),
            follower_id: "user1".to_string(),
            followee_id: "user2".to_string(),
            created_at: Utc::now().into(),
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[edge]])
                .into_connection(),
        );
        let service = create_service(db);

        assert!(service.is_following("user1", "user2").await.unwrap());
    }
}
