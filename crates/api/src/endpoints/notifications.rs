//! Notification endpoints.

use axum::{
    Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use ripple_common::AppResult;
use ripple_db::entities::notification::{self, TargetKind};
use serde::Serialize;

use crate::{
    extractors::AuthUser,
    middleware::AppState,
    pagination::{Page, PageQuery},
    response::ApiResponse,
};

const DEFAULT_PAGE_SIZE: u64 = 10;

/// Notification representation.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResponse {
    pub id: String,
    pub actor_id: String,
    pub verb: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    pub is_read: bool,
    pub created_at: String,
}

impl From<notification::Model> for NotificationResponse {
    fn from(n: notification::Model) -> Self {
        Self {
            id: n.id,
            actor_id: n.actor_id,
            verb: n.verb,
            target_kind: n.target_kind.map(|k| target_kind_to_string(&k)),
            target_id: n.target_id,
            metadata: n.metadata,
            is_read: n.is_read,
            created_at: n.created_at.to_rfc3339(),
        }
    }
}

fn target_kind_to_string(kind: &TargetKind) -> String {
    match kind {
        TargetKind::Post => "post".to_string(),
        TargetKind::Comment => "comment".to_string(),
    }
}

/// Notification page envelope with the unread count.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationListResponse {
    #[serde(flatten)]
    pub page: Page<NotificationResponse>,
    pub unread_count: u64,
}

/// List the caller's notifications, unread first then newest first.
async fn list_notifications(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
) -> AppResult<ApiResponse<NotificationListResponse>> {
    let size = page.size(DEFAULT_PAGE_SIZE);
    let list = state
        .notification_service
        .list_for(&user.id, size, page.offset(DEFAULT_PAGE_SIZE))
        .await?;

    Ok(ApiResponse::ok(NotificationListResponse {
        page: Page::new(
            list.total,
            page.page(),
            size,
            list.notifications.into_iter().map(Into::into).collect(),
        ),
        unread_count: list.unread_count,
    }))
}

/// Mark a single notification as read.
async fn mark_read(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(notification_id): Path<String>,
) -> AppResult<ApiResponse<NotificationResponse>> {
    let updated = state
        .notification_service
        .mark_read(&user.id, &notification_id)
        .await?;

    Ok(ApiResponse::ok(updated.into()))
}

/// Mark-all-read response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkAllReadResponse {
    pub count: u64,
}

/// Mark every unread notification as read.
async fn mark_all_read(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<MarkAllReadResponse>> {
    let count = state.notification_service.mark_all_read(&user.id).await?;
    Ok(ApiResponse::ok(MarkAllReadResponse { count }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_notifications))
        .route("/{id}/read", post(mark_read))
        .route("/read-all", post(mark_all_read))
}
