//! Request and response bodies for the authentication endpoints
//!
//! Request types carry plaintext passwords, so their `Debug` output
//! redacts them.

use chrono::{DateTime, Utc};
use rolodex_core::UserRecord;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// User registration request
#[derive(Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub username: String,
    #[serde(default)]
    pub fullname: String,
    pub password: String,
}

impl std::fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("username", &self.username)
            .field("fullname", &self.fullname)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// User login request
#[derive(Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Issued bearer token
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    /// Seconds until the token expires
    pub expires_in: i64,
}

/// Public view of a user, never includes the password hash
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserInfo {
    pub username: String,
    pub fullname: String,
    pub created_at: DateTime<Utc>,
}

impl From<UserRecord> for UserInfo {
    fn from(record: UserRecord) -> Self {
        Self {
            username: record.username,
            fullname: record.fullname,
            created_at: record.created_at,
        }
    }
}

/// The user behind a validated bearer token
///
/// Added to request extensions by the auth middleware; extract it in
/// handlers with `Extension<AuthenticatedUser>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub username: String,
    pub fullname: String,
    pub created_at: DateTime<Utc>,
}

impl From<UserRecord> for AuthenticatedUser {
    fn from(record: UserRecord) -> Self {
        Self {
            username: record.username,
            fullname: record.fullname,
            created_at: record.created_at,
        }
    }
}

impl From<AuthenticatedUser> for UserInfo {
    fn from(user: AuthenticatedUser) -> Self {
        Self {
            username: user.username,
            fullname: user.fullname,
            created_at: user.created_at,
        }
    }
}
