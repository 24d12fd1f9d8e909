//! Rolodex storage backends
//!
//! Provides [`UserStore`] and [`ContactStore`] implementations:
//! - [`MemoryStore`]: process-local, for development and tests
//! - [`PgStore`]: PostgreSQL via SQLx

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use rolodex_core::{ContactStore, DatabaseConfig, Result, StorageBackend, UserStore};
use std::sync::Arc;

/// Both collaborators, usually backed by the same store
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub contacts: Arc<dyn ContactStore>,
}

impl Stores {
    /// Fresh in-memory stores
    pub fn memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            users: store.clone(),
            contacts: store,
        }
    }

    /// Open the backend selected in configuration
    pub async fn open(config: &DatabaseConfig) -> Result<Self> {
        match config.backend {
            StorageBackend::Memory => {
                tracing::info!("Using in-memory storage");
                Ok(Self::memory())
            }
            StorageBackend::Postgres => {
                tracing::info!("Connecting to PostgreSQL");
                let store =
                    Arc::new(PgStore::connect(&config.postgres_url, config.postgres_pool_size).await?);
                Ok(Self {
                    users: store.clone(),
                    contacts: store,
                })
            }
        }
    }
}
