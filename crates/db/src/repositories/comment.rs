//! Comment repository.

use std::sync::Arc;

use crate::entities::{Comment, comment};
use ripple_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};

/// Ordering for comment listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommentOrder {
    /// Oldest first (default, thread reading order)
    #[default]
    CreatedAsc,
    CreatedDesc,
    UpdatedAsc,
    UpdatedDesc,
}

impl CommentOrder {
    /// Parse an ordering parameter (`-` prefix means descending).
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "created_at" => Some(Self::CreatedAsc),
            "-created_at" => Some(Self::CreatedDesc),
            "updated_at" => Some(Self::UpdatedAsc),
            "-updated_at" => Some(Self::UpdatedDesc),
            _ => None,
        }
    }
}

/// Comment repository for database operations.
#[derive(Clone)]
pub struct CommentRepository {
    db: Arc<DatabaseConnection>,
}

impl CommentRepository {
    /// Create a new comment repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a comment by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<comment::Model>> {
        Comment::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a comment by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<comment::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Comment {id}")))
    }

    /// Create a comment on the given connection (pool or transaction).
    pub async fn create<C: ConnectionTrait>(
        &self,
        conn: &C,
        model: comment::ActiveModel,
    ) -> AppResult<comment::Model> {
        model
            .insert(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a comment.
    pub async fn update(&self, model: comment::ActiveModel) -> AppResult<comment::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a comment on the given connection.
    pub async fn delete<C: ConnectionTrait>(&self, conn: &C, id: &str) -> AppResult<()> {
        Comment::delete_by_id(id)
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
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
    ) -> AppResult<Vec<comment::Model>> {
        let mut query = Comment::find().filter(Self::list_condition(post_id, author_id, search));

        query = match order {
            CommentOrder::CreatedAsc => query.order_by_asc(comment::Column::Id),
            CommentOrder::CreatedDesc => query.order_by_desc(comment::Column::Id),
            CommentOrder::UpdatedAsc => query
                .order_by_asc(comment::Column::UpdatedAt)
                .order_by_asc(comment::Column::Id),
            CommentOrder::UpdatedDesc => query
                .order_by_desc(comment::Column::UpdatedAt)
                .order_by_desc(comment::Column::Id),
        };

        query
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count comments matching the listing filters.
    pub async fn count(
        &self,
        post_id: Option<&str>,
        author_id: Option<&str>,
        search: Option<&str>,
    ) -> AppResult<u64> {
        Comment::find()
            .filter(Self::list_condition(post_id, author_id, search))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    fn list_condition(
        post_id: Option<&str>,
        author_id: Option<&str>,
        search: Option<&str>,
    ) -> Condition {
        let mut condition = Condition::all();

        if let Some(post) = post_id {
            condition = condition.add(comment::Column::PostId.eq(post));
        }

        if let Some(author) = author_id {
            condition = condition.add(comment::Column::AuthorId.eq(author));
        }

        if let Some(q) = search {
            let pattern = format!("%{}%", q.replace('%', "\\%").replace('_', "\\_"));
            condition = condition.add(comment::Column::Content.like(&pattern));
        }

        condition
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_comment(id: &str, post_id: &str, author_id: &str) -> comment::Model {
        comment::Model {
            id: id.to_string(),
            post_id: post_id.to_string(),
            author_id: author_id.to_string(),
            content: "Nice post".to_string(),
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[test]
    fn test_comment_order_parse() {
        assert_eq!(CommentOrder::parse("created_at"), Some(CommentOrder::CreatedAsc));
        assert_eq!(
            CommentOrder::parse("-updated_at"),
            Some(CommentOrder::UpdatedDesc)
        );
        assert_eq!(CommentOrder::parse("title"), None);
    }

    #[tokio::test]
    async fn test_get_by_id_not_found_returns_error() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<comment::Model>::new()])
                .into_connection(),
        );

        let repo = CommentRepository::new(db);
        assert!(matches!(
            repo.get_by_id("nonexistent").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_list_filters_by_post() {
        let c1 = create_test_comment("c1", "post1", "user1");
        let c2 = create_test_comment("c2", "post1", "user2");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[c1, c2]])
                .into_connection(),
        );

        let repo = CommentRepository::new(db);
        let result = repo
            .list(Some("post1"), None, None, CommentOrder::CreatedAsc, 20, 0)
            .await
            .unwrap();

        assert_eq!(result.len(), 2);
    }
}
