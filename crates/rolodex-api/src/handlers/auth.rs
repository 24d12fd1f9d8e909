//! Authentication API handlers
//!
//! Registration, login and the current-user profile.
//!
//! Author: hephaex@gmail.com

use crate::audit::ClientInfo;
use crate::auth::{AuthenticatedUser, LoginRequest, RegisterRequest, TokenResponse, UserInfo};
use crate::error::AppError;
use crate::state::AppState;
use axum::{extract::State, http::HeaderMap, Extension, Json};
use std::sync::Arc;

/// Register a new user
///
/// # Request Body
///
/// * `username` - Unique login name, 1 to 64 characters, no whitespace
/// * `fullname` - Display name (optional)
/// * `password` - Any non-empty password
///
/// # Responses
///
/// * `200 OK` - User registered
/// * `400 Bad Request` - Username already registered or invalid input
/// * `500 Internal Server Error` - Server error
#[utoipa::path(
    post,
    path = "/user",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "User registered successfully", body = UserInfo),
        (status = 400, description = "Username already registered", body = crate::error::ApiError),
        (status = 500, description = "Internal server error", body = crate::error::ApiError),
    )
)]
pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<UserInfo>, AppError> {
    let user = state
        .auth
        .register(request, ClientInfo::from_headers(&headers))
        .await?;

    Ok(Json(user))
}

/// Exchange username and password for an access token
///
/// Unknown usernames and wrong passwords get the same response.
///
/// # Responses
///
/// * `200 OK` - Bearer token issued
/// * `401 Unauthorized` - Incorrect username or password
/// * `500 Internal Server Error` - Server error
#[utoipa::path(
    post,
    path = "/authenticate",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 401, description = "Incorrect username or password", body = crate::error::ApiError),
        (status = 500, description = "Internal server error", body = crate::error::ApiError),
    )
)]
pub async fn authenticate_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let token = state
        .auth
        .login(request, ClientInfo::from_headers(&headers))
        .await?;

    Ok(Json(token))
}

/// Get current user profile
#[utoipa::path(
    get,
    path = "/user/me",
    tag = "auth",
    responses(
        (status = 200, description = "Current user profile", body = UserInfo),
        (status = 401, description = "Could not validate credentials", body = crate::error::ApiError),
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn me_handler(Extension(user): Extension<AuthenticatedUser>) -> Json<UserInfo> {
    Json(UserInfo::from(user))
}
