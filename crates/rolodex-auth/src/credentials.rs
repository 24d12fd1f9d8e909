//! Credential registration and verification
//!
//! Owns no token or network logic. Hashing and verification are CPU bound
//! and run on tokio's blocking pool.

use crate::password::{
    hash_password_with_config, validate_password_input, verify_password, PasswordConfig,
};
use rolodex_core::{Credential, NewUser, RolodexError, UserRecord, UserStore};
use std::sync::Arc;
use thiserror::Error;

/// Longest accepted username, in characters
pub const MAX_USERNAME_CHARS: usize = 64;

/// Credential errors
///
/// `UnknownUsername` and `IncorrectPassword` are distinct here so that logs
/// can tell them apart; the HTTP layer reports both the same way.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("Username already registered")]
    DuplicateUsername,

    #[error("Unknown username")]
    UnknownUsername,

    #[error("Incorrect password")]
    IncorrectPassword,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<RolodexError> for CredentialError {
    fn from(err: RolodexError) -> Self {
        match err {
            RolodexError::Conflict(_) => CredentialError::DuplicateUsername,
            other => CredentialError::Storage(other.to_string()),
        }
    }
}

/// Verifies (username, password) pairs against persisted salted hashes
#[derive(Clone)]
pub struct CredentialStore {
    users: Arc<dyn UserStore>,
    password_config: PasswordConfig,
}

impl CredentialStore {
    pub fn new(users: Arc<dyn UserStore>, password_config: PasswordConfig) -> Self {
        Self {
            users,
            password_config,
        }
    }

    /// The user-lookup collaborator backing this store
    pub fn users(&self) -> &Arc<dyn UserStore> {
        &self.users
    }

    /// Register a username with no display name
    pub async fn register(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Credential, CredentialError> {
        self.register_user(username, "", password)
            .await
            .map(|record| record.credential())
    }

    /// Register a new user
    ///
    /// Fails with `DuplicateUsername` if the name is taken, leaving the
    /// existing record untouched. The store's own uniqueness check on insert
    /// covers the window between lookup and insert.
    pub async fn register_user(
        &self,
        username: &str,
        fullname: &str,
        password: &str,
    ) -> Result<UserRecord, CredentialError> {
        validate_username(username).map_err(CredentialError::InvalidInput)?;
        validate_password_input(password).map_err(CredentialError::InvalidInput)?;

        if self.users.find_by_username(username).await?.is_some() {
            tracing::debug!(username, "registration rejected, username taken");
            return Err(CredentialError::DuplicateUsername);
        }

        let password_hash = self.hash(password).await?;

        let record = self
            .users
            .insert_user(NewUser {
                username: username.to_string(),
                fullname: fullname.to_string(),
                password_hash,
            })
            .await?;

        tracing::debug!(username, "credential created");
        Ok(record)
    }

    /// Check a password against the stored hash
    ///
    /// * `Ok(true)` - exact match
    /// * `Ok(false)` - wrong password
    /// * `Err(UnknownUsername)` - no such user
    pub async fn verify(&self, username: &str, password: &str) -> Result<bool, CredentialError> {
        self.check(username, password)
            .await
            .map(|(_, matched)| matched)
    }

    /// Like [`verify`](Self::verify) but returns the user on a match and
    /// turns a mismatch into `IncorrectPassword`
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<UserRecord, CredentialError> {
        match self.check(username, password).await? {
            (record, true) => Ok(record),
            (_, false) => Err(CredentialError::IncorrectPassword),
        }
    }

    async fn check(
        &self,
        username: &str,
        password: &str,
    ) -> Result<(UserRecord, bool), CredentialError> {
        let record = self
            .users
            .find_by_username(username)
            .await?
            .ok_or(CredentialError::UnknownUsername)?;

        let password = password.to_owned();
        let hash = record.password_hash.clone();

        let matched = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(|e| CredentialError::Hashing(format!("verification task failed: {e}")))?
            .map_err(|e| CredentialError::Hashing(e.to_string()))?;

        Ok((record, matched))
    }

    async fn hash(&self, password: &str) -> Result<String, CredentialError> {
        let password = password.to_owned();
        let config = self.password_config.clone();

        tokio::task::spawn_blocking(move || hash_password_with_config(&password, &config))
            .await
            .map_err(|e| CredentialError::Hashing(format!("hashing task failed: {e}")))?
            .map_err(|e| CredentialError::Hashing(e.to_string()))
    }
}

/// Usernames are 1 to 64 characters with no whitespace or control characters
pub fn validate_username(username: &str) -> Result<(), String> {
    if username.is_empty() {
        return Err("Username must not be empty".to_string());
    }

    if username.chars().count() > MAX_USERNAME_CHARS {
        return Err(format!(
            "Username must be at most {MAX_USERNAME_CHARS} characters long"
        ));
    }

    if username
        .chars()
        .any(|c| c.is_whitespace() || c.is_control())
    {
        return Err("Username must not contain whitespace or control characters".to_string());
    }

    Ok(())
}
