//! Storage abstraction trait
//!
//! This module defines the `PhotoStorage` trait that every backend implements.

use crate::keys::PhotoKey;
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Where a stored file ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Backend key used to read the file back
    pub key: String,
    /// Publicly reachable URL
    pub url: String,
}

/// Storage abstraction trait
///
/// The upload pipeline writes an original and a thumbnail for every photo and
/// keeps the returned URLs; archive export reads originals back by key.
#[async_trait]
pub trait PhotoStorage: Send + Sync {
    /// Store the original image bytes.
    async fn put_original(
        &self,
        key: &PhotoKey,
        content_type: &str,
        data: Bytes,
    ) -> StorageResult<StoredObject>;

    /// Store the thumbnail bytes.
    ///
    /// Backends that derive thumbnails themselves may ignore `data`.
    async fn put_thumbnail(
        &self,
        key: &PhotoKey,
        content_type: &str,
        data: Bytes,
    ) -> StorageResult<StoredObject>;

    /// Public URL of a stored key.
    fn public_url(&self, storage_key: &str) -> String;

    /// Read an original back, by the key returned from `put_original`.
    async fn read_original(&self, storage_key: &str) -> StorageResult<Bytes>;

    /// True when the backend renders thumbnails on its own, so callers can skip
    /// generating them.
    fn derives_thumbnails(&self) -> bool {
        false
    }

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
