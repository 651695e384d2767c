//! Database repositories.

#![allow(missing_docs)]

mod comment;
mod follow;
mod like;
mod notification;
mod post;
mod user;
mod user_profile;

pub use comment::{CommentOrder, CommentRepository};
pub use follow::FollowRepository;
pub use like::LikeRepository;
pub use notification::NotificationRepository;
pub use post::{PostOrder, PostRepository};
pub use user::UserRepository;
pub use user_profile::UserProfileRepository;
