//! Like repository.

use std::sync::Arc;

use crate::entities::{Like, like};
use ripple_common::{AppError, AppResult};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, sea_query::OnConflict,
};

/// Like repository for database operations.
#[derive(Clone)]
pub struct LikeRepository {
    db: Arc<DatabaseConnection>,
}

impl LikeRepository {
    /// Create a new like repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a like by post and user.
    pub async fn find_by_pair(
        &self,
        post_id: &str,
        user_id: &str,
    ) -> AppResult<Option<like::Model>> {
        Like::find()
            .filter(like::Column::PostId.eq(post_id))
            .filter(like::Column::UserId.eq(user_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check if a user has liked a post.
    pub async fn has_liked(&self, post_id: &str, user_id: &str) -> AppResult<bool> {
        Ok(self.find_by_pair(post_id, user_id).await?.is_some())
    }

    /// Insert a like unless one already exists for the (post, user) pair.
    ///
    /// The unique pair index arbitrates concurrent inserts; returns whether
    /// a new row was created.
    pub async fn insert_like<C: ConnectionTrait>(
        &self,
        conn: &C,
        model: like::ActiveModel,
    ) -> AppResult<bool> {
        let rows = Like::insert(model)
            .on_conflict(
                OnConflict::columns([like::Column::PostId, like::Column::UserId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(rows > 0)
    }

    /// Delete a like. Returns whether a like existed.
    pub async fn delete_like<C: ConnectionTrait>(
        &self,
        conn: &C,
        post_id: &str,
        user_id: &str,
    ) -> AppResult<bool> {
        let result = Like::delete_many()
            .filter(like::Column::PostId.eq(post_id))
            .filter(like::Column::UserId.eq(user_id))
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }

    /// Get likes on a post (paginated).
    pub async fn find_by_post(
        &self,
        post_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<like::Model>> {
        Like::find()
            .filter(like::Column::PostId.eq(post_id))
            .order_by_desc(like::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count likes on a post.
    pub async fn count_by_post(&self, post_id: &str) -> AppResult<u64> {
        Like::find()
            .filter(like::Column::PostId.eq(post_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
