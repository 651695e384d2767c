//! User endpoints (public profiles, search, follower listings).

use axum::{
    Router,
    extract::{Path, Query, State},
    routing::get,
};
use ripple_common::AppResult;
use ripple_db::entities::{follow, user};
use serde::{Deserialize, Serialize};

use crate::{
    middleware::AppState,
    pagination::{Page, PageQuery},
    response::ApiResponse,
};

const DEFAULT_PAGE_SIZE: u64 = 10;

/// Public user representation.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub followers_count: i32,
    pub following_count: i32,
    pub posts_count: i32,
    pub created_at: String,
}

impl From<user::Model> for UserResponse {
    fn from(u: user::Model) -> Self {
        Self {
            id: u.id,
            username: u.username,
            name: u.name,
            bio: u.bio,
            avatar_url: u.avatar_url,
            followers_count: u.followers_count,
            following_count: u.following_count,
            posts_count: u.posts_count,
            created_at: u.created_at.to_rfc3339(),
        }
    }
}

/// Follow edge representation.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowItemResponse {
    pub id: String,
    pub follower_id: String,
    pub followee_id: String,
    pub created_at: String,
}

impl From<follow::Model> for FollowItemResponse {
    fn from(f: follow::Model) -> Self {
        Self {
            id: f.id,
            follower_id: f.follower_id,
            followee_id: f.followee_id,
            created_at: f.created_at.to_rfc3339(),
        }
    }
}

/// User listing query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListUsersQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub page: Option<u64>,
    #[serde(default)]
    pub page_size: Option<u64>,
}

impl ListUsersQuery {
    fn page_query(&self) -> PageQuery {
        PageQuery {
            page: self.page.unwrap_or(1),
            page_size: self.page_size,
        }
    }
}

/// List users, optionally filtered by a search term.
async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<ListUsersQuery>,
) -> AppResult<ApiResponse<Page<UserResponse>>> {
    let page = query.page_query();
    let size = page.size(DEFAULT_PAGE_SIZE);
    let search = query.search.as_deref().unwrap_or("");

    let (users, total) = state
        .user_service
        .search(search, size, page.offset(DEFAULT_PAGE_SIZE))
        .await?;

    Ok(ApiResponse::ok(Page::new(
        total,
        page.page(),
        size,
        users.into_iter().map(Into::into).collect(),
    )))
}

/// Get a user's public profile.
async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<ApiResponse<UserResponse>> {
    let user = state.user_service.get(&user_id).await?;
    Ok(ApiResponse::ok(user.into()))
}

/// List followers of a user.
async fn followers(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(page): Query<PageQuery>,
) -> AppResult<ApiResponse<Page<FollowItemResponse>>> {
    // 404 for unknown users
    state.user_service.get(&user_id).await?;

    let size = page.size(DEFAULT_PAGE_SIZE);
    let (edges, total) = state
        .follow_service
        .followers(&user_id, size, page.offset(DEFAULT_PAGE_SIZE))
        .await?;

    Ok(ApiResponse::ok(Page::new(
        total,
        page.page(),
        size,
        edges.into_iter().map(Into::into).collect(),
    )))
}

/// List users a user is following.
async fn following(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(page): Query<PageQuery>,
) -> AppResult<ApiResponse<Page<FollowItemResponse>>> {
    // 404 for unknown users
    state.user_service.get(&user_id).await?;

    let size = page.size(DEFAULT_PAGE_SIZE);
    let (edges, total) = state
        .follow_service
        .following(&user_id, size, page.offset(DEFAULT_PAGE_SIZE))
        .await?;

    Ok(ApiResponse::ok(Page::new(
        total,
        page.page(),
        size,
        edges.into_iter().map(Into::into).collect(),
    )))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users))
        .route("/{id}", get(get_user))
        .route("/{id}/followers", get(followers))
        .route("/{id}/following", get(following))
}
