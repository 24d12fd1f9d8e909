//! Rolodex API Server
//!
//! Configuration comes from the environment, or from the TOML file named by
//! `ROLODEX_CONFIG` with environment overrides.
//!
//! Author: hephaex@gmail.com

use rolodex_api::{create_router, state::AppState};
use rolodex_core::config::{AppConfig, LoggingConfig};
use rolodex_store::Stores;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config_path = std::env::var_os("ROLODEX_CONFIG").map(PathBuf::from);
    let config = AppConfig::load(config_path.as_deref())?;

    init_tracing(&config.logging);
    config.validate()?;

    let addr = format!("{}:{}", config.server.host, config.server.port);

    // Open storage and build application state
    let stores = Stores::open(&config.database).await?;
    let state = Arc::new(AppState::new(config, stores));

    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Rolodex API Server starting on http://{}", addr);
    tracing::info!("OpenAPI spec at http://{}/api-docs/openapi.json", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Initialize tracing; `RUST_LOG` wins over the configured level
fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if logging.level.contains('=') {
            EnvFilter::new(&logging.level)
        } else {
            EnvFilter::new(format!(
                "rolodex_api={level},rolodex_auth={level},rolodex_store={level},audit=info,tower_http={level}",
                level = logging.level
            ))
        }
    });

    if logging.json_format {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
