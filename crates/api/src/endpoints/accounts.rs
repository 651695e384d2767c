//! Account endpoints (registration, login, profile, follow/unfollow).

use axum::{
    Router,
    extract::{Path, State},
    routing::{get, post},
    Json,
};
use ripple_common::AppResult;
use ripple_core::{
    FollowOutcome,
    user::{LoginInput, RegisterInput, UpdateProfileInput},
};
use serde::{Deserialize, Serialize};

use crate::{
    endpoints::users::UserResponse, extractors::AuthUser, middleware::AppState,
    response::ApiResponse,
};

/// Registration request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub name: Option<String>,
    pub bio: Option<String>,
}

/// Authentication response (registration and login).
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user: UserResponse,
    pub token: String,
}

/// Register a new account.
async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<ApiResponse<AuthResponse>> {
    let input = RegisterInput {
        username: req.username,
        email: req.email,
        password: req.password,
        name: req.name,
        bio: req.bio,
    };

    let user = state.user_service.register(input).await?;
    let token = user.token.clone().unwrap_or_default();

    Ok(ApiResponse::created(AuthResponse {
        user: user.into(),
        token,
    }))
}

/// Login request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Log in to an existing account.
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<ApiResponse<AuthResponse>> {
    let (user, token) = state
        .user_service
        .login(LoginInput {
            username: req.username,
            password: req.password,
        })
        .await?;

    Ok(ApiResponse::ok(AuthResponse {
        user: user.into(),
        token,
    }))
}

/// Logout response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailResponse {
    pub detail: String,
}

/// Log out (invalidate the current token).
async fn logout(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<DetailResponse>> {
    state.user_service.logout(user).await?;

    Ok(ApiResponse::ok(DetailResponse {
        detail: "Logout successful".to_string(),
    }))
}

/// Get the caller's profile.
async fn get_profile(AuthUser(user): AuthUser) -> AppResult<ApiResponse<UserResponse>> {
    Ok(ApiResponse::ok(user.into()))
}

/// Profile update request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
}

/// Update the caller's profile.
async fn update_profile(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<UpdateProfileRequest>,
) -> AppResult<ApiResponse<UserResponse>> {
    let updated = state
        .user_service
        .update_profile(
            user,
            UpdateProfileInput {
                name: req.name,
                bio: req.bio,
                avatar_url: req.avatar_url,
            },
        )
        .await?;

    Ok(ApiResponse::ok(updated.into()))
}

/// Follow result response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowResponse {
    pub status: String,
}

/// Follow a user. 201 on a new edge, 200 on an idempotent repeat.
async fn follow(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<ApiResponse<FollowResponse>> {
    let outcome = state.follow_service.follow(&user.id, &user_id).await?;

    let response = match outcome {
        FollowOutcome::Created => ApiResponse::created(FollowResponse {
            status: "following".to_string(),
        }),
        FollowOutcome::AlreadyFollowing => ApiResponse::ok(FollowResponse {
            status: "already following".to_string(),
        }),
    };

    Ok(response)
}

/// Unfollow a user.
async fn unfollow(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<ApiResponse<FollowResponse>> {
    state.follow_service.unfollow(&user.id, &user_id).await?;

    Ok(ApiResponse::ok(FollowResponse {
        status: "unfollowed".to_string(),
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/profile", get(get_profile).patch(update_profile))
        .route("/follow/{user_id}", post(follow))
        .route("/unfollow/{user_id}", post(unfollow))
}
