//! Authentication middleware for protecting routes
//!
//! Extracts the bearer token from the Authorization header and resolves it
//! through `AuthService`. On success, adds the user to request extensions.
use crate::audit::ClientInfo;
use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Authentication middleware that requires a valid bearer token
///
/// This middleware:
/// 1. Extracts the Authorization header
/// 2. Checks the `Bearer` scheme
/// 3. Validates the token and loads its subject
/// 4. Adds AuthenticatedUser to request extensions
///
/// # Usage
///
/// ```ignore
/// use axum::{middleware, routing::get, Router};
/// use rolodex_api::auth::auth_middleware;
///
/// let app = Router::new()
///     .route("/user/me", get(me_handler))
///     .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));
/// ```
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let client = ClientInfo::from_headers(request.headers());

    let token = bearer_token(request.headers()).ok_or(AppError::Unauthorized)?;
    let user = state.auth.resolve_bearer(token, client).await?;

    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

/// Pull the token out of an `Authorization: Bearer <token>` header
///
/// The scheme is matched case-insensitively. Returns `None` for a missing
/// header, another scheme or an empty token.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
