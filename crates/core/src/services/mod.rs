//! Business logic services.

#![allow(missing_docs)]

pub mod comment;
pub mod feed;
pub mod follow;
pub mod like;
pub mod notification;
pub mod post;
pub mod user;

pub use comment::{CommentService, CreateCommentInput, UpdateCommentInput};
pub use feed::FeedService;
pub use follow::{FollowOutcome, FollowService};
pub use like::{LikeOutcome, LikeService};
pub use notification::{NotificationList, NotificationService};
pub use post::{CreatePostInput, PostService, UpdatePostInput};
pub use user::{LoginInput, RegisterInput, UpdateProfileInput, UserService};

use validator::ValidationError;

/// Reject empty or whitespace-only strings.
pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("cannot be blank".into());
        return Err(err);
    }
    Ok(())
}
