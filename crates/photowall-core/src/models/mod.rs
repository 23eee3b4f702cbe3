//! Domain models

pub mod batch;
pub mod export;
pub mod photo;

pub use batch::{Batch, CreateBatchRequest, CreateBatchResponse};
pub use export::{BatchExport, ExportPhoto, ExportResponse};
pub use photo::{
    ListPhotosResponse, Photo, PhotoResponse, StreamEvent, TogglePhotoDeletedRequest,
    TogglePhotoDeletedResponse,
};

use crate::AppError;

/// Maximum length of a client-supplied batch or photo identifier
pub const MAX_IDENTIFIER_LEN: usize = 128;

/// Check that a client-supplied identifier is safe to embed in storage keys.
///
/// Identifiers are opaque, but they end up inside object keys such as
/// `photos/{batch_id}/{photo_id}.jpg`, so only ASCII letters, digits, `-` and
/// `_` are accepted.
pub fn validate_identifier(field: &str, value: &str) -> Result<(), AppError> {
    if value.is_empty() {
        return Err(AppError::InvalidInput(format!("{} is required", field)));
    }
    if value.len() > MAX_IDENTIFIER_LEN {
        return Err(AppError::InvalidInput(format!(
            "{} must be at most {} characters",
            field, MAX_IDENTIFIER_LEN
        )));
    }
    if !value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(AppError::InvalidInput(format!(
            "{} may only contain letters, digits, '-' and '_'",
            field
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_uuid_identifiers() {
        assert!(validate_identifier("batchId", "0f8fad5b-d9cb-469f-a165-70867728950e").is_ok());
        assert!(validate_identifier("fileId", "photo_01").is_ok());
    }

    #[test]
    fn test_rejects_path_like_identifiers() {
        assert!(validate_identifier("batchId", "").is_err());
        assert!(validate_identifier("batchId", "../etc").is_err());
        assert!(validate_identifier("batchId", "a/b").is_err());
        assert!(validate_identifier("batchId", &"x".repeat(MAX_IDENTIFIER_LEN + 1)).is_err());
    }
}
