//! API integration tests.
//!
//! These tests drive the router end to end over a mock database and check
//! the REST status-code contract.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use maplit::btreemap;
use ripple_api::{middleware::AppState, router as api_router};
use ripple_core::{
    CommentService, FeedService, FollowService, LikeService, NotificationService, PostService,
    UserService,
};
use ripple_db::entities::{post, user};
use ripple_db::repositories::{
    CommentRepository, FollowRepository, LikeRepository, NotificationRepository, PostRepository,
    UserProfileRepository, UserRepository,
};
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
use std::sync::Arc;
use tower::ServiceExt;

fn create_state(db: Arc<DatabaseConnection>) -> AppState {
    let user_repo = UserRepository::new(Arc::clone(&db));
    let profile_repo = UserProfileRepository::new(Arc::clone(&db));
    let follow_repo = FollowRepository::new(Arc::clone(&db));
    let post_repo = PostRepository::new(Arc::clone(&db));
    let comment_repo = CommentRepository::new(Arc::clone(&db));
    let like_repo = LikeRepository::new(Arc::clone(&db));
    let notification_repo = NotificationRepository::new(Arc::clone(&db));

    let notification_service = NotificationService::new(notification_repo);

    AppState {
        user_service: UserService::new(Arc::clone(&db), user_repo.clone(), profile_repo),
        follow_service: FollowService::new(
            Arc::clone(&db),
            follow_repo.clone(),
            user_repo.clone(),
            notification_service.clone(),
        ),
        post_service: PostService::new(Arc::clone(&db), post_repo.clone(), user_repo.clone()),
        comment_service: CommentService::new(
            Arc::clone(&db),
            comment_repo,
            post_repo.clone(),
            notification_service.clone(),
        ),
        like_service: LikeService::new(
            Arc::clone(&db),
            like_repo,
            post_repo.clone(),
            notification_service.clone(),
        ),
        notification_service,
        feed_service: FeedService::new(follow_repo, post_repo),
    }
}

fn create_app(db: Arc<DatabaseConnection>) -> Router {
    api_router().with_state(create_state(db))
}

fn test_user(id: &str, username: &str) -> user::Model {
    user::Model {
        id: id.to_string(),
        username: username.to_string(),
        username_lower: username.to_lowercase(),
        token: Some("token123".to_string()),
        name: None,
        bio: None,
        avatar_url: None,
        followers_count: 0,
        following_count: 0,
        posts_count: 0,
        is_admin: false,
        created_at: chrono::Utc::now().into(),
        updated_at: None,
    }
}

fn test_post(id: &str, author_id: &str) -> post::Model {
    post::Model {
        id: id.to_string(),
        author_id: author_id.to_string(),
        title: "Hello".to_string(),
        content: "World".to_string(),
        comments_count: 0,
        likes_count: 0,
        created_at: chrono::Utc::now().into(),
        updated_at: None,
    }
}

#[tokio::test]
async fn test_create_post_without_token_is_unauthorized() {
    let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
    let app = create_app(db);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/posts")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"title":"Hello","content":"World"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_feed_without_token_is_unauthorized() {
    let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
    let app = create_app(db);

    let response = app
        .oneshot(Request::builder().uri("/feed").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_with_short_password_is_bad_request() {
    let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
    let app = create_app(db);

    let body = r#"{"username":"alice","email":"alice@example.com","password":"short"}"#;
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/accounts/register")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_unknown_user_is_not_found() {
    let db = Arc::new(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()])
            .into_connection(),
    );
    let app = create_app(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/users/nonexistent")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_posts_returns_page_envelope() {
    let db = Arc::new(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![test_post("p1", "u1"), test_post("p2", "u2")]])
            .append_query_results([vec![
                btreemap! { "num_items" => Into::<sea_orm::Value>::into(2i64) },
            ]])
            .into_connection(),
    );
    let app = create_app(db);

    let response = app
        .oneshot(Request::builder().uri("/posts").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(body["count"], 2);
    assert_eq!(body["results"].as_array().unwrap().len(), 2);
    assert!(body["next"].is_null());
    assert!(body["previous"].is_null());
}

#[tokio::test]
async fn test_list_posts_with_unknown_ordering_is_bad_request() {
    let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
    let app = create_app(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/posts?ordering=popularity")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_post_returns_payload() {
    let db = Arc::new(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_post("p1", "u1")]])
            .into_connection(),
    );
    let app = create_app(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/posts/p1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(body["id"], "p1");
    assert_eq!(body["authorId"], "u1");
    assert_eq!(body["title"], "Hello");
}

#[tokio::test]
async fn test_error_body_carries_code_and_message() {
    let db = Arc::new(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<post::Model>::new()])
            .into_connection(),
    );
    let app = create_app(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/posts/ghost")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(body["error"]["code"], "POST_NOT_FOUND");
    assert!(body["error"]["message"].as_str().unwrap().contains("ghost"));
}

#[tokio::test]
async fn test_follow_yourself_is_bad_request() {
    // Auth middleware is wired in the server binary; tests inject the user
    // extension directly.
    let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
    let state = create_state(db);
    let user = test_user("u1", "alice");

    let app = api_router()
        .layer(axum::middleware::from_fn(
            move |mut req: Request<Body>, next: axum::middleware::Next| {
                let user = user.clone();
                async move {
                    req.extensions_mut().insert(user);
                    next.run(req).await
                }
            },
        ))
        .with_state(state);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/accounts/follow/u1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
