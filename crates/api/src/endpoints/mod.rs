//! API endpoints.

mod accounts;
mod comments;
mod feed;
mod notifications;
mod posts;
mod users;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/accounts", accounts::router())
        .nest("/posts", posts::router())
        .nest("/comments", comments::router())
        .nest("/feed", feed::router())
        .nest("/notifications", notifications::router())
        .nest("/users", users::router())
}
