//! Photowall Storage Library
//!
//! Storage abstraction for photo originals and thumbnails, with backends for
//! S3-compatible object stores (including R2), the local filesystem and a
//! managed image CDN.
//!
//! # Storage key format
//!
//! Object backends store every photo twice:
//!
//! - **Original**: `photos/{batch_id}/{photo_id}.{ext}`
//! - **Thumbnail**: `thumbnails/{batch_id}/{photo_id}.{ext}`
//!
//! The image CDN stores a single image under the custom id
//! `{batch_id}-{photo_id}` and serves the thumbnail as a variant of it.
//! Keys must not contain `..` or a leading `/`.

pub mod factory;
#[cfg(feature = "storage-images")]
pub mod images;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
#[cfg(feature = "storage-images")]
pub use images::ImagesStorage;
pub use keys::{extension_for, PhotoKey};
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use photowall_core::StorageBackend;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{PhotoStorage, StorageError, StorageResult, StoredObject};
