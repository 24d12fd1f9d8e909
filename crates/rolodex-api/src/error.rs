//! API error handling
//!
//! Every failure of the authentication core is collapsed here. Unknown
//! usernames and wrong passwords produce the same 401 body, and all token
//! failures produce another single 401 body, so a caller cannot learn which
//! part of a credential or token was wrong.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use rolodex_auth::{CredentialError, TokenError};
use rolodex_core::RolodexError;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Login failure message, shared by unknown users and wrong passwords
pub const INVALID_CREDENTIALS: &str = "Incorrect username or password";

/// Bearer failure message, shared by every token problem
pub const COULD_NOT_VALIDATE: &str = "Could not validate credentials";

/// API error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// Error code
    pub code: String,
    /// Human-readable message
    pub message: String,
    /// Additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn not_found(resource: &str) -> Self {
        Self::new("NOT_FOUND", format!("{resource} not found"))
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("BAD_REQUEST", message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new("UNAUTHORIZED", message)
    }

    pub fn internal_error() -> Self {
        Self::new("INTERNAL_ERROR", "Internal server error")
    }
}

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    /// Login rejected
    #[error("Incorrect username or password")]
    InvalidCredentials,

    /// Bearer token missing or rejected
    #[error("Could not validate credentials")]
    Unauthorized,

    #[error("internal error: {0}")]
    Internal(String),

    #[error("database error: {0}")]
    Database(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ApiError::not_found(&msg)),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ApiError::bad_request(msg)),
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                ApiError::unauthorized(INVALID_CREDENTIALS),
            ),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                ApiError::unauthorized(COULD_NOT_VALIDATE),
            ),
            AppError::Internal(msg) => {
                // Details stay in the log, not in the response
                tracing::error!(error = %msg, "internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, ApiError::internal_error())
            }
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiError::new("DATABASE_ERROR", "Database operation failed"),
                )
            }
        };

        let mut response = (status, Json(error)).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<RolodexError> for AppError {
    fn from(err: RolodexError) -> Self {
        match err {
            RolodexError::NotFound(msg) => AppError::NotFound(msg),
            RolodexError::Conflict(msg) => AppError::BadRequest(msg),
            RolodexError::ValidationError(msg) => AppError::BadRequest(msg),
            RolodexError::DatabaseError(msg) => AppError::Database(msg),
            RolodexError::ConfigError(msg) => {
                AppError::Internal(format!("Configuration error: {msg}"))
            }
            RolodexError::Other(err) => AppError::Internal(err.to_string()),
        }
    }
}

impl From<CredentialError> for AppError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::DuplicateUsername => {
                AppError::BadRequest("Username already registered".to_string())
            }
            CredentialError::UnknownUsername | CredentialError::IncorrectPassword => {
                AppError::InvalidCredentials
            }
            CredentialError::InvalidInput(msg) => AppError::BadRequest(msg),
            CredentialError::Hashing(msg) => AppError::Internal(msg),
            CredentialError::Storage(msg) => AppError::Database(msg),
        }
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Malformed | TokenError::SignatureMismatch | TokenError::Expired => {
                AppError::Unauthorized
            }
            other => AppError::Internal(format!("Failed to issue token: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_failures_are_indistinguishable() {
        let unknown = AppError::from(CredentialError::UnknownUsername).into_response();
        let wrong = AppError::from(CredentialError::IncorrectPassword).into_response();

        assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            unknown.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );
    }

    #[test]
    fn test_token_failures_collapse() {
        for err in [
            TokenError::Malformed,
            TokenError::SignatureMismatch,
            TokenError::Expired,
        ] {
            assert!(matches!(AppError::from(err), AppError::Unauthorized));
        }
        assert!(matches!(
            AppError::from(TokenError::EmptySubject),
            AppError::Internal(_)
        ));
    }

    #[test]
    fn test_display_matches_response_message() {
        assert_eq!(
            AppError::InvalidCredentials.to_string(),
            "Incorrect username or password"
        );
        assert_eq!(
            AppError::Unauthorized.to_string(),
            "Could not validate credentials"
        );
    }

    #[test]
    fn test_duplicate_username_is_bad_request() {
        let response = AppError::from(CredentialError::DuplicateUsername).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(response.headers().get(header::WWW_AUTHENTICATE).is_none());
    }
}
