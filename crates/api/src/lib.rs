//! HTTP API layer for ripple.
//!
//! This crate provides the REST API:
//!
//! - **Endpoints**: accounts, follows, posts, comments, likes, feed,
//!   notifications, users
//! - **Extractors**: authentication
//! - **Middleware**: bearer-token resolution, application state
//! - **Pagination**: page-number envelopes for list endpoints
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod pagination;
pub mod response;

pub use endpoints::router;
pub use middleware::AppState;
