//! API middleware.

#![allow(missing_docs)]

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use ripple_core::{
    CommentService, FeedService, FollowService, LikeService, NotificationService, PostService,
    UserService,
};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub follow_service: FollowService,
    pub post_service: PostService,
    pub comment_service: CommentService,
    pub like_service: LikeService,
    pub notification_service: NotificationService,
    pub feed_service: FeedService,
}

/// Authentication middleware.
///
/// Resolves a `Bearer` token to a user and stores it in request extensions;
/// handlers decide via [`crate::extractors::AuthUser`] whether auth is
/// required.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(auth_header) = req.headers().get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
        && let Ok(user) = state.user_service.authenticate_by_token(token).await
    {
        req.extensions_mut().insert(user);
    }

    next.run(req).await
}
