//! Startup: telemetry, config checks, database, storage and routes.

pub mod database;
pub mod routes;
pub mod server;
pub mod storage;
pub mod validation;

use crate::state::AppState;
use anyhow::{Context, Result};
use photowall_core::Config;
use photowall_db::PgCatalog;
use std::sync::Arc;

/// Build the shared state and the router from a loaded config.
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Telemetry first, so config warnings are not lost
    photowall_infra::init_telemetry(config.log_format())
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    validation::validate_config(&config).context("Configuration validation failed")?;
    tracing::info!(
        environment = %config.environment(),
        storage = %config.storage_backend(),
        port = config.server_port(),
        "Starting photowall"
    );

    let pool = database::setup_database(&config).await?;
    let storage = storage::setup_storage(&config).await?;

    let state = Arc::new(AppState::new(
        config.clone(),
        Arc::new(PgCatalog::new(pool)),
        storage,
    ));

    let router = routes::setup_routes(&config, Arc::clone(&state))?;

    Ok((state, router))
}
