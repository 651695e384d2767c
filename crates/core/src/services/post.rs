//! Post service.

use crate::policy;
use ripple_common::{AppError, AppResult, IdGenerator};
use ripple_db::{
    entities::{post, user},
    repositories::{PostOrder, PostRepository, UserRepository},
};
use sea_orm::{DatabaseConnection, Set, TransactionTrait};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

/// Post service for business logic.
#[derive(Clone)]
pub struct PostService {
    db: Arc<DatabaseConnection>,
    post_repo: PostRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

/// Input for creating a post.
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePostInput {
    #[validate(length(max = 256), custom(function = crate::services::not_blank))]
    pub title: String,

    #[validate(custom(function = crate::services::not_blank))]
    pub content: String,
}

/// Input for updating a post.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePostInput {
    #[validate(length(max = 256), custom(function = crate::services::not_blank))]
    pub title: Option<String>,

    #[validate(custom(function = crate::services::not_blank))]
    pub content: Option<String>,
}

impl PostService {
    /// Create a new post service.
    #[must_use]
    pub fn new(
        db: Arc<DatabaseConnection>,
        post_repo: PostRepository,
        user_repo: UserRepository,
    ) -> Self {
        Self {
            db,
            post_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a post.
    pub async fn create(&self, author: &user::Model, input: CreatePostInput) -> AppResult<post::Model> {
        input.validate()?;

        let model = post::ActiveModel {
            id: Set(self.id_gen.generate()),
            author_id: Set(author.id.clone()),
            title: Set(input.title),
            content: Set(input.content),
            created_at: Set(chrono::Utc::now().into()),
            ..Default::default()
        };

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let created = self.post_repo.create(&txn, model).await?;
        self.user_repo.increment_posts_count(&txn, &author.id).await?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::debug!(post_id = %created.id, author_id = %author.id, "Created post");
        Ok(created)
    }

    /// Get a post by ID.
    pub async fn get(&self, id: &str) -> AppResult<post::Model> {
        self.post_repo.get_by_id(id).await
    }

    /// Update a post. Only the author (or an admin) may update.
    pub async fn update(
        &self,
        actor: &user::Model,
        post_id: &str,
        input: UpdatePostInput,
    ) -> AppResult<post::Model> {
        input.validate()?;

        let post = self.post_repo.get_by_id(post_id).await?;
        policy::require_owner(actor, &post.author_id)?;

        let mut active: post::ActiveModel = post.into();

        if let Some(title) = input.title {
            active.title = Set(title);
        }
        if let Some(content) = input.content {
            active.content = Set(content);
        }

        active.updated_at = Set(Some(chrono::Utc::now().into()));

        self.post_repo.update(active).await
    }

    /// Delete a post. Only the author (or an admin) may delete.
    ///
    /// Comments and likes go with it via cascade.
    pub async fn delete(&self, actor: &user::Model, post_id: &str) -> AppResult<()> {
        let post = self.post_repo.get_by_id(post_id).await?;
        policy::require_owner(actor, &post.author_id)?;

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        self.post_repo.delete(&txn, post_id).await?;
        self.user_repo
            .decrement_posts_count(&txn, &post.author_id)
            .await?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::debug!(post_id = %post_id, "Deleted post");
        Ok(())
    }

    /// List posts with search, ordering, and author filter (paginated).
    pub async fn list(
        &self,
        search: Option<&str>,
        author_id: Option<&str>,
        order: PostOrder,
        limit: u64,
        offset: u64,
    ) -> AppResult<(Vec<post::Model>, u64)> {
        let posts = self
            .post_repo
            .list(search, author_id, order, limit, offset)
            .await?;
        let total = self.post_repo.count(search, author_id).await?;
        Ok((posts, total))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

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
            likes_count: 0,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn create_service(db: Arc<DatabaseConnection>) -> PostService {
        let post_repo = PostRepository::new(Arc::clone(&db));
        let user_repo = UserRepository::new(Arc::clone(&db));
        PostService::new(db, post_repo, user_repo)
    }

    #[tokio::test]
    async fn test_create_rejects_blank_title() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = create_service(db);
        let author = create_test_user("u1");

        let result = service
            .create(
                &author,
                CreatePostInput {
                    title: "   ".to_string(),
                    content: "World".to_string(),
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_blank_content() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = create_service(db);
        let author = create_test_user("u1");

        let result = service
            .create(
                &author,
                CreatePostInput {
                    title: "Hello".to_string(),
                    content: String::new(),
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_by_non_author_is_forbidden() {
        let post = create_test_post("p1", "owner");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[post]])
                .into_connection(),
        );
        let service = create_service(db);
        let intruder = create_test_user("intruder");

        let result = service
            .update(
                &intruder,
                "p1",
                UpdatePostInput {
                    title: Some("Hijacked".to_string()),
                    content: None,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_delete_by_non_author_is_forbidden() {
        let post = create_test_post("p1", "owner");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[post]])
                .into_connection(),
        );
        let service = create_service(db);
        let intruder = create_test_user("intruder");

        let result = service.delete(&intruder, "p1").await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_get_missing_post_is_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<post::Model>::new()])
                .into_connection(),
        );
        let service = create_service(db);

        let result = service.get("ghost").await;
        assert!(matches!(result, Err(AppError::PostNotFound(_))));
    }
}
