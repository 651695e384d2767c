//! Feed service.
//!
//! Derives a per-user timeline from the follow graph: posts authored by
//! followed users, newest first. Own posts never appear because self-follow
//! is impossible.

use ripple_common::AppResult;
use ripple_db::{
    entities::post,
    repositories::{FollowRepository, PostRepository},
};

/// Feed service for business logic.
#[derive(Clone)]
pub struct FeedService {
    follow_repo: FollowRepository,
    post_repo: PostRepository,
}

impl FeedService {
    /// Create a new feed service.
    #[must_use]
    pub const fn new(follow_repo: FollowRepository, post_repo: PostRepository) -> Self {
        Self {
            follow_repo,
            post_repo,
        }
    }

    /// Get the feed for a user (paginated).
    pub async fn feed(
        &self,
        user_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<(Vec<post::Model>, u64)> {
        let following = self.follow_repo.following_ids(user_id).await?;

        if following.is_empty() {
            return Ok((vec![], 0));
        }

        let posts = self
            .post_repo
            .find_by_authors(&following, limit, offset)
            .await?;
        let total = self.post_repo.count_by_authors(&following).await?;

        Ok((posts, total))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use maplit::btreemap;
    use ripple_db::entities::follow;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

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

    #[tokio::test]
    async fn test_feed_is_empty_when_following_nobody() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<follow::Model>::new()])
                .into_connection(),
        );

        let service = FeedService::new(
            FollowRepository::new(Arc::clone(&db)),
            PostRepository::new(db),
        );

        let (posts, total) = service.feed("user1", 10, 0).await.unwrap();

        assert!(posts.is_empty());
        assert_eq!(total, 0);
    }

    #[tokio::test]
    async fn test_feed_contains_followed_authors_posts() {
        let edge = follow::Model {
            id: "f1".to_string(),
            follower_id: "user1".to_string(),
            followee_id: "user2".to_string(),
            created_at: Utc::now().into(),
        };
        let p1 = create_test_post("p2", "user2");
        let p2 = create_test_post("p1", "user2");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[edge]])
                .append_query_results([[p1, p2]])
                .append_query_results([vec![
                    btreemap! { "num_items" => Into::<sea_orm::Value>::into(2i64) },
                ]])
                .into_connection(),
        );

        let service = FeedService::new(
            FollowRepository::new(Arc::clone(&db)),
            PostRepository::new(db),
        );

        let (posts, total) = service.feed("user1", 10, 0).await.unwrap();

        assert_eq!(posts.len(), 2);
        assert_eq!(total, 2);
        assert!(posts.iter().all(|p| p.author_id == "user2"));
    }
}
