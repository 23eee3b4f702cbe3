//! Shared key generation for storage backends.

use crate::traits::{StorageError, StorageResult};

const MAX_EXTENSION_LEN: usize = 10;

/// Identifies where one photo's files live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoKey {
    pub batch_id: String,
    pub photo_id: String,
    pub extension: String,
}

impl PhotoKey {
    pub fn new(
        batch_id: impl Into<String>,
        photo_id: impl Into<String>,
        extension: impl Into<String>,
    ) -> Self {
        Self {
            batch_id: batch_id.into(),
            photo_id: photo_id.into(),
            extension: extension.into(),
        }
    }

    /// `photos/{batch_id}/{photo_id}.{ext}`
    pub fn original_key(&self) -> String {
        format!("photos/{}/{}.{}", self.batch_id, self.photo_id, self.extension)
    }

    /// `thumbnails/{batch_id}/{photo_id}.{ext}`
    pub fn thumbnail_key(&self) -> String {
        format!(
            "thumbnails/{}/{}.{}",
            self.batch_id, self.photo_id, self.extension
        )
    }

    /// Custom image id used by the image CDN.
    pub fn image_id(&self) -> String {
        format!("{}-{}", self.batch_id, self.photo_id)
    }

    pub fn with_extension(&self, extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
            ..self.clone()
        }
    }
}

/// File extension for a stored photo.
///
/// Taken from the uploaded filename when it has a sane one, otherwise derived
/// from the content type.
pub fn extension_for(filename: Option<&str>, content_type: &str) -> String {
    let from_name = filename
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| {
            !ext.is_empty()
                && ext.len() <= MAX_EXTENSION_LEN
                && ext.chars().all(|c| c.is_ascii_alphanumeric())
        });
    if let Some(ext) = from_name {
        return ext;
    }

    match content_type.to_ascii_lowercase().as_str() {
        "image/png" => "png",
        "image/webp" => "webp",
        "image/heic" => "heic",
        "image/heif" => "heif",
        "image/gif" => "gif",
        _ => "jpg",
    }
    .to_string()
}

/// Reject keys that could escape the storage root.
pub(crate) fn validate_key(storage_key: &str) -> StorageResult<()> {
    if storage_key.is_empty() || storage_key.contains("..") || storage_key.starts_with('/') {
        return Err(StorageError::InvalidKey(
            "Storage key contains invalid characters".to_string(),
        ));
    }
    Ok(())
}
