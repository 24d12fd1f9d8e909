//! Application state management

use crate::auth::AuthService;
use rolodex_auth::{CredentialStore, PasswordConfig, TokenConfig, TokenService};
use rolodex_core::{AppConfig, ContactStore};
use rolodex_store::Stores;
use std::sync::Arc;
use std::time::Instant;

/// Application state shared across handlers
///
/// Everything here is read-only after construction; the stores handle their
/// own synchronization.
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,
    /// Server start time
    pub start_time: Instant,
    /// Registration, login and bearer resolution
    pub auth: AuthService,
    /// Contact CRUD collaborator
    pub contacts: Arc<dyn ContactStore>,
}

impl AppState {
    /// Build state from configuration and opened stores
    pub fn new(config: AppConfig, stores: Stores) -> Self {
        let password_config = PasswordConfig::from(&config.auth);
        Self::with_password_config(config, stores, password_config)
    }

    /// Build state with explicit hashing costs
    pub fn with_password_config(
        config: AppConfig,
        stores: Stores,
        password_config: PasswordConfig,
    ) -> Self {
        let tokens = TokenService::new(TokenConfig::from(&config.auth));
        let credentials = CredentialStore::new(stores.users, password_config);

        Self {
            config,
            start_time: Instant::now(),
            auth: AuthService::new(credentials, tokens),
            contacts: stores.contacts,
        }
    }

    /// In-memory state with cheap hashing, for tests
    pub fn for_testing() -> Self {
        Self::with_password_config(
            AppConfig::default(),
            Stores::memory(),
            PasswordConfig::insecure_fast(),
        )
    }

    /// Get uptime in seconds
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
