//! Rolodex Core - Domain models, traits, and shared types
//!
//! This crate defines the core abstractions used throughout Rolodex:
//! - User records and the credential view used for authentication
//! - Contact models
//! - Common error types
//! - Storage traits implemented by `rolodex-store`
//! - Configuration management

pub mod config;

pub use config::{
    AppConfig, AuthConfig, ConfigError, DatabaseConfig, LoggingConfig, ServerConfig,
    StorageBackend,
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for Rolodex operations
#[derive(Error, Debug)]
pub enum RolodexError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, RolodexError>;

// ============================================================================
// Users and credentials
// ============================================================================

/// Persisted user row
///
/// `password_hash` is a PHC string; the salt and hashing parameters are
/// encoded inside it, so no separate salt column exists.
#[derive(Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub username: String,
    pub fullname: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    /// The credential view of this user
    pub fn credential(&self) -> Credential {
        Credential {
            username: self.username.clone(),
            password_hash: self.password_hash.clone(),
        }
    }
}

impl std::fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserRecord")
            .field("username", &self.username)
            .field("fullname", &self.fullname)
            .field("password_hash", &"<redacted>")
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// A user to be inserted; the password is already hashed
#[derive(Clone)]
pub struct NewUser {
    pub username: String,
    pub fullname: String,
    pub password_hash: String,
}

impl std::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewUser")
            .field("username", &self.username)
            .field("fullname", &self.fullname)
            .field("password_hash", &"<redacted>")
            .finish()
    }
}

/// Username plus salted hash, one per username
///
/// Immutable once created. `Debug` never prints the hash.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub username: String,
    pub password_hash: String,
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .field("password_hash", &"<redacted>")
            .finish()
    }
}

// ============================================================================
// Contacts
// ============================================================================

/// A stored phone contact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: i64,
    pub phone: String,
}

/// Contact creation payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewContact {
    pub phone: String,
}

impl NewContact {
    /// Reject empty phone numbers
    pub fn validate(&self) -> Result<()> {
        validate_phone(&self.phone)
    }
}

/// Partial contact update
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactPatch {
    pub phone: Option<String>,
}

impl ContactPatch {
    pub fn validate(&self) -> Result<()> {
        match &self.phone {
            Some(phone) => validate_phone(phone),
            None => Ok(()),
        }
    }
}

fn validate_phone(phone: &str) -> Result<()> {
    let phone = phone.trim();
    if phone.is_empty() {
        return Err(RolodexError::ValidationError(
            "phone must not be empty".to_string(),
        ));
    }
    if phone.len() > 32 {
        return Err(RolodexError::ValidationError(
            "phone must be at most 32 characters".to_string(),
        ));
    }
    Ok(())
}

// ============================================================================
// Storage traits
// ============================================================================

/// User lookup and insertion
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Find a user by unique username
    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>>;

    /// Insert a new user
    ///
    /// Implementations enforce username uniqueness themselves and return
    /// `RolodexError::Conflict` when the username is taken.
    async fn insert_user(&self, user: NewUser) -> Result<UserRecord>;
}

/// Contact CRUD
#[async_trait]
pub trait ContactStore: Send + Sync {
    async fn create_contact(&self, contact: NewContact) -> Result<Contact>;

    async fn list_contacts(&self) -> Result<Vec<Contact>>;

    async fn get_contact(&self, id: i64) -> Result<Option<Contact>>;

    /// Apply a patch; returns `None` when the contact does not exist
    async fn update_contact(&self, id: i64, patch: ContactPatch) -> Result<Option<Contact>>;

    /// Returns `true` when a row was removed
    async fn delete_contact(&self, id: i64) -> Result<bool>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_password_hash() {
        let record = UserRecord {
            username: "alice".to_string(),
            fullname: "Alice Liddell".to_string(),
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_string(),
            created_at: Utc::now(),
        };

        let debug = format!("{record:?}");
        assert!(debug.contains("alice"));
        assert!(!debug.contains("argon2id"));

        let debug = format!("{:?}", record.credential());
        assert!(!debug.contains("argon2id"));
    }

    #[test]
    fn test_contact_validation() {
        assert!(NewContact { phone: "+1 555 0100".to_string() }.validate().is_ok());
        assert!(NewContact { phone: "   ".to_string() }.validate().is_err());
        assert!(NewContact { phone: "9".repeat(33) }.validate().is_err());

        assert!(ContactPatch::default().validate().is_ok());
        assert!(ContactPatch { phone: Some(String::new()) }.validate().is_err());
    }
}
