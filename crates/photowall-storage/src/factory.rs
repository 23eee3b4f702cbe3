#[cfg(feature = "storage-images")]
use crate::ImagesStorage;
#[cfg(feature = "storage-local")]
use crate::LocalStorage;
#[cfg(feature = "storage-s3")]
use crate::S3Storage;
use crate::{PhotoStorage, StorageBackend, StorageError, StorageResult};
use photowall_core::Config;
use std::sync::Arc;

fn required(value: Option<&str>, name: &str) -> StorageResult<String> {
    value
        .map(String::from)
        .ok_or_else(|| StorageError::ConfigError(format!("{} not configured", name)))
}

/// Create a storage backend based on configuration
pub async fn create_storage(config: &Config) -> StorageResult<Arc<dyn PhotoStorage>> {
    match config.storage_backend() {
        #[cfg(feature = "storage-s3")]
        StorageBackend::S3 => {
            let bucket = required(config.s3_bucket(), "S3_BUCKET")?;
            let region = required(config.s3_region(), "S3_REGION or AWS_REGION")?;
            let endpoint = config.s3_endpoint().map(String::from);
            let public_url = config.storage_public_url().map(String::from);

            let storage = S3Storage::new(bucket, region, endpoint, public_url).await?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-s3"))]
        StorageBackend::S3 => Err(StorageError::ConfigError(
            "S3 storage backend not available (storage-s3 feature not enabled)".to_string(),
        )),

        #[cfg(feature = "storage-local")]
        StorageBackend::Local => {
            let base_path = required(config.local_storage_path(), "LOCAL_STORAGE_PATH")?;
            let base_url = required(config.local_storage_base_url(), "LOCAL_STORAGE_BASE_URL")?;

            let storage = LocalStorage::new(base_path, base_url).await?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-local"))]
        StorageBackend::Local => Err(StorageError::ConfigError(
            "Local storage backend not available (storage-local feature not enabled)".to_string(),
        )),

        #[cfg(feature = "storage-images")]
        StorageBackend::Images => {
            let account_id = required(config.images_account_id(), "IMAGES_ACCOUNT_ID")?;
            let api_token = required(config.images_api_token(), "IMAGES_API_TOKEN")?;
            let account_hash = required(config.images_account_hash(), "IMAGES_ACCOUNT_HASH")?;

            let storage = ImagesStorage::new(account_id, api_token, account_hash)?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-images"))]
        StorageBackend::Images => Err(StorageError::ConfigError(
            "Image CDN backend not available (storage-images feature not enabled)".to_string(),
        )),
    }
}
