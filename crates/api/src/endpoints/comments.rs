//! Comment endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
};
use ripple_common::{AppError, AppResult};
use ripple_db::{entities::comment, repositories::CommentOrder};
use ripple_core::comment::{CreateCommentInput, UpdateCommentInput};
use serde::{Deserialize, Serialize};

use crate::{
    extractors::AuthUser,
    middleware::AppState,
    pagination::{Page, PageQuery},
    response::{ApiResponse, no_content},
};

const DEFAULT_PAGE_SIZE: u64 = 20;

/// Comment representation.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: String,
    pub post_id: String,
    pub author_id: String,
    pub content: String,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl From<comment::Model> for CommentResponse {
    fn from(c: comment::Model) -> Self {
        Self {
            id: c.id,
            post_id: c.post_id,
            author_id: c.author_id,
            content: c.content,
            created_at: c.created_at.to_rfc3339(),
            updated_at: c.updated_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// Comment listing query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListCommentsQuery {
    /// Filter by post ID.
    #[serde(default)]
    pub post: Option<String>,
    /// Filter by author user ID.
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
    /// Ordering field, `-`-prefixed for descending (default `created_at`).
    #[serde(default)]
    pub ordering: Option<String>,
    #[serde(default)]
    pub page: Option<u64>,
    #[serde(default)]
    pub page_size: Option<u64>,
}

impl ListCommentsQuery {
    fn page_query(&self) -> PageQuery {
        PageQuery {
            page: self.page.unwrap_or(1),
            page_size: self.page_size,
        }
    }
}

/// List comments filtered by post, author, and text search.
async fn list_comments(
    State(state): State<AppState>,
    Query(query): Query<ListCommentsQuery>,
) -> AppResult<ApiResponse<Page<CommentResponse>>> {
    let order = match query.ordering.as_deref() {
        None => CommentOrder::default(),
        Some(raw) => CommentOrder::parse(raw)
            .ok_or_else(|| AppError::BadRequest(format!("Unknown ordering: {raw}")))?,
    };

    let page = query.page_query();
    let size = page.size(DEFAULT_PAGE_SIZE);
    let (comments, total) = state
        .comment_service
        .list(
            query.post.as_deref(),
            query.author.as_deref(),
            query.search.as_deref(),
            order,
            size,
            page.offset(DEFAULT_PAGE_SIZE),
        )
        .await?;

    Ok(ApiResponse::ok(Page::new(
        total,
        page.page(),
        size,
        comments.into_iter().map(Into::into).collect(),
    )))
}

/// Comment creation request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub post_id: String,
    pub content: String,
}

/// Create a comment on a post.
async fn create_comment(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateCommentRequest>,
) -> AppResult<ApiResponse<CommentResponse>> {
    let created = state
        .comment_service
        .create(
            &user,
            CreateCommentInput {
                post_id: req.post_id,
                content: req.content,
            },
        )
        .await?;

    Ok(ApiResponse::created(created.into()))
}

/// Get a comment.
async fn get_comment(
    State(state): State<AppState>,
    Path(comment_id): Path<String>,
) -> AppResult<ApiResponse<CommentResponse>> {
    let comment = state.comment_service.get(&comment_id).await?;
    Ok(ApiResponse::ok(comment.into()))
}

/// Comment update request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCommentRequest {
    pub content: String,
}

/// Update a comment (author only).
async fn update_comment(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(comment_id): Path<String>,
    Json(req): Json<UpdateCommentRequest>,
) -> AppResult<ApiResponse<CommentResponse>> {
    let updated = state
        .comment_service
        .update(
            &user,
            &comment_id,
            UpdateCommentInput {
                content: req.content,
            },
        )
        .await?;

    Ok(ApiResponse::ok(updated.into()))
}

/// Delete a comment (author only).
async fn delete_comment(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(comment_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.comment_service.delete(&user, &comment_id).await?;
    Ok(no_content())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_comments).post(create_comment))
        .route(
            "/{id}",
            get(get_comment).patch(update_comment).delete(delete_comment),
        )
}
