//! Database entities.

#![allow(missing_docs)]

pub mod comment;
pub mod follow;
pub mod like;
pub mod notification;
pub mod post;
pub mod user;
pub mod user_profile;

pub use comment::Entity as Comment;
pub use follow::Entity as Follow;
pub use like::Entity as Like;
pub use notification::Entity as Notification;
pub use post::Entity as Post;
pub use user::Entity as User;
pub use user_profile::Entity as UserProfile;
