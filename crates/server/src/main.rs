//! Ripple server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Router, middleware};
use ripple_api::{middleware::AppState, router as api_router};
use ripple_common::Config;
use ripple_core::{
    CommentService, FeedService, FollowService, LikeService, NotificationService, PostService,
    UserService,
};
use ripple_db::repositories::{
    CommentRepository, FollowRepository, LikeRepository, NotificationRepository, PostRepository,
    UserProfileRepository, UserRepository,
};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ripple=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting ripple server...");

    // Load configuration (.env first so RIPPLE__* variables apply)
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    // Connect to database
    let db = ripple_db::init(&config).await?;
    info!("Connected to database");

    // Run migrations
    info!("Running database migrations...");
    ripple_db::migrate(&db).await?;
    info!("Migrations completed");

    // Initialize repositories
    let db = Arc::new(db);
    let user_repo = UserRepository::new(Arc::clone(&db));
    let profile_repo = UserProfileRepository::new(Arc::clone(&db));
    let follow_repo = FollowRepository::new(Arc::clone(&db));
    let post_repo = PostRepository::new(Arc::clone(&db));
    let comment_repo = CommentRepository::new(Arc::clone(&db));
    let like_repo = LikeRepository::new(Arc::clone(&db));
    let notification_repo = NotificationRepository::new(Arc::clone(&db));

    // Initialize services
    let notification_service = NotificationService::new(notification_repo);
    let user_service = UserService::new(Arc::clone(&db), user_repo.clone(), profile_repo);
    let follow_service = FollowService::new(
        Arc::clone(&db),
        follow_repo.clone(),
        user_repo.clone(),
        notification_service.clone(),
    );
    let post_service = PostService::new(Arc::clone(&db), post_repo.clone(), user_repo);
    let comment_service = CommentService::new(
        Arc::clone(&db),
        comment_repo,
        post_repo.clone(),
        notification_service.clone(),
    );
    let like_service = LikeService::new(
        Arc::clone(&db),
        like_repo,
        post_repo.clone(),
        notification_service.clone(),
    );
    let feed_service = FeedService::new(follow_repo, post_repo);

    // Create app state
    let state = AppState {
        user_service,
        follow_service,
        post_service,
        comment_service,
        like_service,
        notification_service,
        feed_service,
    };

    // Build router
    let app = Router::new()
        .merge(api_router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            ripple_api::middleware::auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server with graceful shutdown
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
