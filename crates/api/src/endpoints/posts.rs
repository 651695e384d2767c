//! Post endpoints (CRUD, like/unlike).

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{get, post},
};
use ripple_common::{AppError, AppResult};
use ripple_db::{entities::post, repositories::PostOrder};
use ripple_core::post::{CreatePostInput, UpdatePostInput};
use serde::{Deserialize, Serialize};

use crate::{
    extractors::AuthUser,
    middleware::AppState,
    pagination::{Page, PageQuery},
    response::{ApiResponse, no_content},
};

const DEFAULT_PAGE_SIZE: u64 = 10;

/// Post representation.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: String,
    pub author_id: String,
    pub title: String,
    pub content: String,
    pub comments_count: i32,
    pub likes_count: i32,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl From<post::Model> for PostResponse {
    fn from(p: post::Model) -> Self {
        Self {
            id: p.id,
            author_id: p.author_id,
            title: p.title,
            content: p.content,
            comments_count: p.comments_count,
            likes_count: p.likes_count,
            created_at: p.created_at.to_rfc3339(),
            updated_at: p.updated_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// Post listing query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPostsQuery {
    #[serde(default)]
    pub search: Option<String>,
    /// Filter by author user ID.
    #[serde(default)]
    pub author: Option<String>,
    /// Ordering field, `-`-prefixed for descending (default `-created_at`).
    #[serde(default)]
    pub ordering: Option<String>,
    #[serde(default)]
    pub page: Option<u64>,
    #[serde(default)]
    pub page_size: Option<u64>,
}

impl ListPostsQuery {
    fn page_query(&self) -> PageQuery {
        PageQuery {
            page: self.page.unwrap_or(1),
            page_size: self.page_size,
        }
    }
}

/// List posts with search, ordering, and author filter.
async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<ListPostsQuery>,
) -> AppResult<ApiResponse<Page<PostResponse>>> {
    let order = match query.ordering.as_deref() {
        None => PostOrder::default(),
        Some(raw) => PostOrder::parse(raw)
            .ok_or_else(|| AppError::BadRequest(format!("Unknown ordering: {raw}")))?,
    };

    let page = query.page_query();
    let size = page.size(DEFAULT_PAGE_SIZE);
    let (posts, total) = state
        .post_service
        .list(
            query.search.as_deref(),
            query.author.as_deref(),
            order,
            size,
            page.offset(DEFAULT_PAGE_SIZE),
        )
        .await?;

    Ok(ApiResponse::ok(Page::new(
        total,
        page.page(),
        size,
        posts.into_iter().map(Into::into).collect(),
    )))
}

/// Post creation request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
}

/// Create a post.
async fn create_post(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreatePostRequest>,
) -> AppResult<ApiResponse<PostResponse>> {
    let created = state
        .post_service
        .create(
            &user,
            CreatePostInput {
                title: req.title,
                content: req.content,
            },
        )
        .await?;

    Ok(ApiResponse::created(created.into()))
}

/// Get a post.
async fn get_post(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> AppResult<ApiResponse<PostResponse>> {
    let post = state.post_service.get(&post_id).await?;
    Ok(ApiResponse::ok(post.into()))
}

/// Post update request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
}

/// Update a post (author only).
async fn update_post(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    Json(req): Json<UpdatePostRequest>,
) -> AppResult<ApiResponse<PostResponse>> {
    let updated = state
        .post_service
        .update(
            &user,
            &post_id,
            UpdatePostInput {
                title: req.title,
                content: req.content,
            },
        )
        .await?;

    Ok(ApiResponse::ok(updated.into()))
}

/// Delete a post (author only).
async fn delete_post(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.post_service.delete(&user, &post_id).await?;
    Ok(no_content())
}

/// Like result response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeResponse {
    pub detail: String,
    pub likes_count: u64,
}

/// Like a post. 201 on a new like, 200 on an idempotent repeat.
async fn like_post(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> AppResult<ApiResponse<LikeResponse>> {
    let outcome = state.like_service.like(&user, &post_id).await?;

    let response = if outcome.created {
        ApiResponse::created(LikeResponse {
            detail: "Post liked".to_string(),
            likes_count: outcome.likes_count,
        })
    } else {
        ApiResponse::ok(LikeResponse {
            detail: "Post already liked".to_string(),
            likes_count: outcome.likes_count,
        })
    };

    Ok(response)
}

/// Remove a like from a post.
async fn unlike_post(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> AppResult<ApiResponse<LikeResponse>> {
    let outcome = state.like_service.unlike(&user, &post_id).await?;

    Ok(ApiResponse::ok(LikeResponse {
        detail: "Post unliked".to_string(),
        likes_count: outcome.likes_count,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_posts).post(create_post))
        .route(
            "/{id}",
            get(get_post).patch(update_post).delete(delete_post),
        )
        .route("/{id}/like", post(like_post))
        .route("/{id}/unlike", post(unlike_post))
}
