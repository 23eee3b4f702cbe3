//! Storage setup and initialization

use anyhow::{Context, Result};
use photowall_core::Config;
use photowall_storage::{create_storage, PhotoStorage};
use std::sync::Arc;

/// Build the storage backend selected by `STORAGE_BACKEND`.
pub async fn setup_storage(config: &Config) -> Result<Arc<dyn PhotoStorage>> {
    tracing::info!(backend = %config.storage_backend(), "Initializing storage...");
    let storage = create_storage(config)
        .await
        .context("Failed to initialize storage backend")?;

    tracing::info!(
        backend = %storage.backend_type(),
        derives_thumbnails = storage.derives_thumbnails(),
        thumbnails_enabled = config.thumbnail_enabled(),
        "Storage initialized successfully"
    );

    Ok(storage)
}
