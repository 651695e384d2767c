//! Comment service.

use crate::policy;
use crate::services::notification::NotificationService;
use ripple_common::{AppError, AppResult, IdGenerator};
use ripple_db::{
    entities::{comment, notification::TargetKind, user},
    repositories::{CommentOrder, CommentRepository, PostRepository},
};
use sea_orm::{DatabaseConnection, Set, TransactionTrait};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

/// Comment service for business logic.
#[derive(Clone)]
pub struct CommentService {
    db: Arc<DatabaseConnection>,
    comment_repo: CommentRepository,
    post_repo: PostRepository,
    notifier: NotificationService,
    id_gen: IdGenerator,
}

/// Input for creating a comment.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCommentInput {
    pub post_id: String,

    #[validate(custom(function = crate::services::not_blank))]
    pub content: String,
}

/// Input for updating a comment.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCommentInput {
    #[validate(custom(function = crate::services::not_blank))]
    pub content: String,
}

impl CommentService {
    /// Create a new comment service.
    #[must_use]
    pub fn new(
        db: Arc<DatabaseConnection>,
        comment_repo: CommentRepository,
        post_repo: PostRepository,
        notifier: NotificationService,
    ) -> Self {
        Self {
            db,
            comment_repo,
            post_repo,
            notifier,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a comment on a post.
    ///
    /// The comment insert, the post's comment counter, and the notification
    /// to the post's author share one transaction. Commenting on your own
    /// post produces no notification.
    pub async fn create(
        &self,
        author: &user::Model,
        input: CreateCommentInput,
    ) -> AppResult<comment::Model> {
        input.validate()?;

        let post = self.post_repo.get_by_id(&input.post_id).await?;

        let model = comment::ActiveModel {
            id: Set(self.id_gen.generate()),
            post_id: Set(post.id.clone()),
            author_id: Set(author.id.clone()),
            content: Set(input.content),
            created_at: Set(chrono::Utc::now().into()),
            ..Default::default()
        };

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let created = self.comment_repo.create(&txn, model).await?;
        self.post_repo.increment_comments_count(&txn, &post.id).await?;
        self.notifier
            .notify(
                &txn,
                &post.author_id,
                &author.id,
                "commented on your post",
                Some((TargetKind::Post, &post.id)),
                Some(json!({ "comment_id": created.id, "post_id": post.id })),
            )
            .await?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::debug!(comment_id = %created.id, post_id = %post.id, "Created comment");
        Ok(created)
    }

    /// Get a comment by ID.
    pub async fn get(&self, id: &str) -> AppResult<comment::Model> {
        self.comment_repo.get_by_id(id).await
    }

    /// Update a comment. Only the author (or an admin) may update.
    pub async fn update(
        &self,
        actor: &user::Model,
        comment_id: &str,
        input: UpdateCommentInput,
    ) -> AppResult<comment::Model> {
        input.validate()?;

        let comment = self.comment_repo.get_by_id(comment_id).await?;
        policy::require_owner(actor, &comment.author_id)?;

        let mut active: comment::ActiveModel = comment.into();
        active.content = Set(input.content);
        active.updated_at = Set(Some(chrono::Utc::now().into()));

        self.comment_repo.update(active).await
    }

    /// Delete a comment. Only the author (or an admin) may delete.
    pub async fn delete(&self, actor: &user::Model, comment_id: &str) -> AppResult<()> {
        let comment = self.comment_repo.get_by_id(comment_id).await?;
        policy::require_owner(actor, &comment.author_id)?;

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        self.comment_repo.delete(&txn, comment_id).await?;
        self.post_repo
            .decrement_comments_count(&txn, &comment.post_id)
            .await?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::debug!(comment_id = %comment_id, "Deleted comment");
        Ok(())
    }

    /// List comments filtered by post, author, and text search (paginated).
    pub async fn list(
        &self,
        post_id: Option<&str>,
        author_id: Option<&str>,
        search: Option<&str>,
        order: CommentOrder,
        limit: u64,
        offset: u64,
    ) -> AppResult<(Vec<comment::Model>, u64)> {
        let comments = self
            .comment_repo
            .list(post_id, author_id, search, order, limit, offset)
            .await?;
        let total = self.comment_repo.count(post_id, author_id, search).await?;
        Ok((comments, total))
    }
}
