//! Application state shared by every handler.

use std::sync::Arc;

use photowall_core::Config;
use photowall_db::PhotoCatalog;
use photowall_processing::{ThumbnailGenerator, UploadValidator};
use photowall_storage::PhotoStorage;

use crate::services::broadcast::BroadcastHub;

/// Upload limits and the optional thumbnail generator, derived from config once at startup.
#[derive(Debug, Clone)]
pub struct UploadSettings {
    pub validator: UploadValidator,
    pub thumbnails: Option<ThumbnailGenerator>,
}

impl UploadSettings {
    pub fn from_config(config: &Config) -> Self {
        let thumbnails = config.thumbnail_enabled().then(|| {
            ThumbnailGenerator::new(config.thumbnail_max_dimension(), config.thumbnail_quality())
        });

        Self {
            validator: UploadValidator::new(
                config.max_file_size_bytes(),
                config.allowed_content_types().to_vec(),
            ),
            thumbnails,
        }
    }
}

pub struct AppState {
    pub config: Config,
    pub catalog: Arc<dyn PhotoCatalog>,
    pub storage: Arc<dyn PhotoStorage>,
    pub hub: Arc<BroadcastHub>,
    pub uploads: UploadSettings,
}

impl AppState {
    /// Wire the state together. The broadcast hub shares the catalog so it can
    /// look up counts while fanning out.
    pub fn new(
        config: Config,
        catalog: Arc<dyn PhotoCatalog>,
        storage: Arc<dyn PhotoStorage>,
    ) -> Self {
        let hub = Arc::new(BroadcastHub::new(Arc::clone(&catalog)));
        let uploads = UploadSettings::from_config(&config);

        Self {
            config,
            catalog,
            storage,
            hub,
            uploads,
        }
    }
}
