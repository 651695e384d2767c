//! Feed endpoint.

use axum::{
    Router,
    extract::{Query, State},
    routing::get,
};
use ripple_common::AppResult;

use crate::{
    endpoints::posts::PostResponse,
    extractors::AuthUser,
    middleware::AppState,
    pagination::{Page, PageQuery},
    response::ApiResponse,
};

const DEFAULT_PAGE_SIZE: u64 = 10;

/// Get the caller's feed: posts by followed users, newest first.
async fn feed(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
) -> AppResult<ApiResponse<Page<PostResponse>>> {
    let size = page.size(DEFAULT_PAGE_SIZE);
    let (posts, total) = state
        .feed_service
        .feed(&user.id, size, page.offset(DEFAULT_PAGE_SIZE))
        .await?;

    Ok(ApiResponse::ok(Page::new(
        total,
        page.page(),
        size,
        posts.into_iter().map(Into::into).collect(),
    )))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(feed))
}
