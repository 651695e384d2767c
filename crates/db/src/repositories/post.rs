//! Post repository.

use std::sync::Arc;

use crate::entities::{Post, post};
use ripple_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, sea_query::Expr,
};

/// Ordering for post listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PostOrder {
    /// Newest first (default)
    #[default]
    CreatedDesc,
    CreatedAsc,
    UpdatedDesc,
    UpdatedAsc,
    TitleAsc,
    TitleDesc,
}

impl PostOrder {
    /// Parse an ordering parameter (`-` prefix means descending).
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "created_at" => Some(Self::CreatedAsc),
            "-created_at" => Some(Self::CreatedDesc),
            "updated_at" => Some(Self::UpdatedAsc),
            "-updated_at" => Some(Self::UpdatedDesc),
            "title" => Some(Self::TitleAsc),
            "-title" => Some(Self::TitleDesc),
            _ => None,
        }
    }
}

/// Post repository for database operations.
#[derive(Clone)]
pub struct PostRepository {
    db: Arc<DatabaseConnection>,
}

impl PostRepository {
    /// Create a new post repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a post by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<post::Model>> {
        Post::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a post by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<post::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::PostNotFound(id.to_string()))
    }

    /// Create a new post on the given connection (pool or transaction).
    pub async fn create<C: ConnectionTrait>(
        &self,
        conn: &C,
        model: post::ActiveModel,
    ) -> AppResult<post::Model> {
        model
            .insert(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a post.
    pub async fn update(&self, model: post::ActiveModel) -> AppResult<post::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a post on the given connection.
    pub async fn delete<C: ConnectionTrait>(&self, conn: &C, id: &str) -> AppResult<()> {
        Post::delete_by_id(id)
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// List posts with optional text search and author filter (paginated).
    pub async fn list(
        &self,
        search: Option<&str>,
        author_id: Option<&str>,
        order: PostOrder,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<post::Model>> {
        let mut query = Post::find().filter(Self::list_condition(search, author_id));

        query = match order {
            PostOrder::CreatedDesc => query.order_by_desc(post::Column::Id),
            PostOrder::CreatedAsc => query.order_by_asc(post::Column::Id),
            PostOrder::UpdatedDesc => query
                .order_by_desc(post::Column::UpdatedAt)
                .order_by_desc(post::Column::Id),
            PostOrder::UpdatedAsc => query
                .order_by_asc(post::Column::UpdatedAt)
                .order_by_asc(post::Column::Id),
            PostOrder::TitleAsc => query
                .order_by_asc(post::Column::Title)
                .order_by_desc(post::Column::Id),
            PostOrder::TitleDesc => query
                .order_by_desc(post::Column::Title)
                .order_by_desc(post::Column::Id),
        };

        query
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count posts matching the listing filters.
    pub async fn count(&self, search: Option<&str>, author_id: Option<&str>) -> AppResult<u64> {
        Post::find()
            .filter(Self::list_condition(search, author_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    fn list_condition(search: Option<&str>, author_id: Option<&str>) -> Condition {
        let mut condition = Condition::all();

        if let Some(q) = search {
            let pattern = format!("%{}%", q.replace('%', "\\%").replace('_', "\\_"));
            condition = condition.add(
                Condition::any()
                    .add(post::Column::Title.like(&pattern))
                    .add(post::Column::Content.like(&pattern)),
            );
        }

        if let Some(author) = author_id {
            condition = condition.add(post::Column::AuthorId.eq(author));
        }

        condition
    }

    /// Get posts authored by any of the given users, newest first (paginated).
    pub async fn find_by_authors(
        &self,
        author_ids: &[String],
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<post::Model>> {
        if author_ids.is_empty() {
            return Ok(vec![]);
        }

        Post::find()
            .filter(post::Column::AuthorId.is_in(author_ids.to_vec()))
            .order_by_desc(post::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count posts authored by any of the given users.
    pub async fn count_by_authors(&self, author_ids: &[String]) -> AppResult<u64> {
        if author_ids.is_empty() {
            return Ok(0);
        }

        Post::find()
            .filter(post::Column::AuthorId.is_in(author_ids.to_vec()))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Increment comment count atomically (single UPDATE, no fetch).
    pub async fn increment_comments_count<C: ConnectionTrait>(
        &self,
        conn: &C,
        post_id: &str,
    ) -> AppResult<()> {
        Post::update_many()
            .col_expr(
                post::Column::CommentsCount,
                Expr::col(post::Column::CommentsCount).add(1),
            )
            .filter(post::Column::Id.eq(post_id))
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Decrement comment count atomically, clamped at zero.
    pub async fn decrement_comments_count<C: ConnectionTrait>(
        &self,
        conn: &C,
        post_id: &str,
    ) -> AppResult<()> {
        Post::update_many()
            .col_expr(
                post::Column::CommentsCount,
                Expr::cust("GREATEST(comments_count - 1, 0)"),
            )
            .filter(post::Column::Id.eq(post_id))
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Increment like count atomically.
    pub async fn increment_likes_count<C: ConnectionTrait>(
        &self,
        conn: &C,
        post_id: &str,
    ) -> AppResult<()> {
        Post::update_many()
            .col_expr(
                post::Column::LikesCount,
                Expr::col(post::Column::LikesCount).add(1),
            )
            .filter(post::Column::Id.eq(post_id))
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Decrement like count atomically, clamped at zero.
    pub async fn decrement_likes_count<C: ConnectionTrait>(
        &self,
        conn: &C,
        post_id: &str,
    ) -> AppResult<()> {
        Post::update_many()
            .col_expr(
                post::Column::LikesCount,
                Expr::cust("GREATEST(likes_count - 1, 0)"),
            )
            .filter(post::Column::Id.eq(post_id))
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}
