//! Like service.

use crate::services::notification::NotificationService;
use ripple_common::{AppError, AppResult, IdGenerator};
use ripple_db::{
    entities::{like, notification::TargetKind, user},
    repositories::{LikeRepository, PostRepository},
};
use sea_orm::{DatabaseConnection, Set, TransactionTrait};
use serde_json::json;
use std::sync::Arc;

/// Result of a like operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeOutcome {
    /// Whether a new like row was created (false on repeat).
    pub created: bool,
    /// Like count on the post after the operation.
    pub likes_count: u64,
}

/// Like service for business logic.
#[derive(Clone)]
pub struct LikeService {
    db: Arc<DatabaseConnection>,
    like_repo: LikeRepository,
    post_repo: PostRepository,
    notifier: NotificationService,
    id_gen: IdGenerator,
}

impl LikeService {
    /// Create a new like service.
    #[must_use]
    pub fn new(
        db: Arc<DatabaseConnection>,
        like_repo: LikeRepository,
        post_repo: PostRepository,
        notifier: NotificationService,
    ) -> Self {
        Self {
            db,
            like_repo,
            post_repo,
            notifier,
            id_gen: IdGenerator::new(),
        }
    }

    /// Like a post.
    ///
    /// Idempotent: the first call creates the like and notifies the post's
    /// author (unless the liker is the author); repeating it is a success
    /// that changes nothing. The like insert, the counter, and the
    /// notification share one transaction, with the unique (post, user)
    /// index arbitrating concurrent requests.
    pub async fn like(&self, user: &user::Model, post_id: &str) -> AppResult<LikeOutcome> {
        let post = self.post_repo.get_by_id(post_id).await?;

        let model = like::ActiveModel {
            id: Set(self.id_gen.generate()),
            post_id: Set(post.id.clone()),
            user_id: Set(user.id.clone()),
            created_at: Set(chrono::Utc::now().into()),
        };

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let created = self.like_repo.insert_like(&txn, model).await?;

        if created {
            self.post_repo.increment_likes_count(&txn, &post.id).await?;
            self.notifier
                .notify(
                    &txn,
                    &post.author_id,
                    &user.id,
                    "liked your post",
                    Some((TargetKind::Post, &post.id)),
                    Some(json!({ "post_id": post.id, "post_title": post.title })),
                )
                .await?;
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let likes_count = self.like_repo.count_by_post(&post.id).await?;

        if created {
            tracing::debug!(post_id = %post.id, user_id = %user.id, "Created like");
        }

        Ok(LikeOutcome {
            created,
            likes_count,
        })
    }

    /// Remove a like from a post.
    ///
    /// Fails with a validation error when the user has not liked the post.
    pub async fn unlike(&self, user: &user::Model, post_id: &str) -> AppResult<LikeOutcome> {
        let post = self.post_repo.get_by_id(post_id).await?;

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let deleted = self.like_repo.delete_like(&txn, &post.id, &user.id).await?;

        if !deleted {
            return Err(AppError::Validation(
                "You have not liked this post".to_string(),
            ));
        }

        self.post_repo.decrement_likes_count(&txn, &post.id).await?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let likes_count = self.like_repo.count_by_post(&post.id).await?;

        tracing::debug!(post_id = %post.id, user_id = %user.id, "Removed like");
        Ok(LikeOutcome {
            created: false,
            likes_count,
        })
    }

    /// Check if a user has liked a post.
    pub async fn has_liked(&self, post_id: &str, user_id: &str) -> AppResult<bool> {
        self.like_repo.has_liked(post_id, user_id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use maplit::btreemap;
    use ripple_db::entities::post;
    use ripple_db::repositories::NotificationRepository;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_user(id: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            username: format!("user_{id}"),
            username_lower: format!("user_{id}"),
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

    fn create_test_post(id: &str, author_id: &str) -> post::Model {
        post::Model {
            id: id.to_string(),
            author_id: author_id.to_string(),
            title: "Hello".to_string(),
            content: "World".to_string(),
            comments_count: 0,
            likes_count: 1,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn create_service(db: Arc<DatabaseConnection>) -> LikeService {
        let like_repo = LikeRepository::new(Arc::clone(&db));
        let post_repo = PostRepository::new(Arc::clone(&db));
        let notifier = NotificationService::new(NotificationRepository::new(Arc::clone(&db)));
        LikeService::new(db, like_repo, post_repo, notifier)
    }

    #[tokio::test]
    async fn test_like_missing_post_is_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<post::Model>::new()])
                .into_connection(),
        );
        let service = create_service(db);
        let user = create_test_user("u1");

        let result = service.like(&user, "ghost").await;
        assert!(matches!(result, Err(AppError::PostNotFound(_))));
    }

    #[tokio::test]
    async fn test_like_repeat_is_idempotent_success() {
        let post = create_test_post("p1", "author");

        // Zero rows affected on conflict; only the count query follows.
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[post]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .append_query_results([vec![
                    btreemap! { "num_items" => Into::<sea_orm::Value>::into(1i64) },
                ]])
                .into_connection(),
        );
        let service = create_service(db);
        let user = create_test_user("carol");

        let outcome = service.like(&user, "p1").await.unwrap();

        assert!(!outcome.created);
        assert_eq!(outcome.likes_count, 1);
    }

    #[tokio::test]
    async fn test_unlike_without_like_fails() {
        let post = create_test_post("p1", "author");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[post]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );
        let service = create_service(db);
        let user = create_test_user("carol");

        let result = service.unlike(&user, "p1").await;

        match result {
            Err(AppError::Validation(msg)) => assert!(msg.contains("not liked")),
            _ => panic!("Expected Validation error"),
        }
    }
}
