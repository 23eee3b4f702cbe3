//! Photo upload orchestration.
//!
//! Validates the request, stores the original and a thumbnail, persists the
//! photo and announces it on the live stream.

use std::sync::Arc;

use bytes::Bytes;
use photowall_core::models::{validate_identifier, Photo};
use photowall_core::{now_millis, AppError};
use photowall_db::PhotoCatalog;
use photowall_processing::{Thumbnail, ThumbnailGenerator, UploadValidator};
use photowall_storage::{extension_for, PhotoKey, PhotoStorage, StorageError, StoredObject};
use uuid::Uuid;

use crate::services::broadcast::BroadcastHub;
use crate::state::AppState;

const MAX_FILENAME_LENGTH: usize = 255;

/// One file taken from the multipart body.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub data: Bytes,
    pub filename: Option<String>,
    pub content_type: String,
}

#[derive(Debug, Clone, Default)]
pub struct UploadRequest {
    pub file: Option<UploadedFile>,
    pub batch_id: Option<String>,
    pub file_id: Option<String>,
}

pub struct UploadService {
    catalog: Arc<dyn PhotoCatalog>,
    storage: Arc<dyn PhotoStorage>,
    hub: Arc<BroadcastHub>,
    validator: UploadValidator,
    thumbnails: Option<ThumbnailGenerator>,
}

impl UploadService {
    pub fn new(state: &AppState) -> Self {
        Self {
            catalog: Arc::clone(&state.catalog),
            storage: Arc::clone(&state.storage),
            hub: Arc::clone(&state.hub),
            validator: state.uploads.validator.clone(),
            thumbnails: state.uploads.thumbnails,
        }
    }

    #[tracing::instrument(
        skip(self, request),
        fields(
            batch_id = ?request.batch_id,
            file_id = ?request.file_id,
            photo_id = tracing::field::Empty
        )
    )]
    pub async fn handle_upload(&self, request: UploadRequest) -> Result<Photo, AppError> {
        let file = request
            .file
            .ok_or_else(|| AppError::InvalidInput("No file provided".to_string()))?;
        let batch_id = request
            .batch_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .ok_or_else(|| AppError::InvalidInput("batchId is required".to_string()))?;
        validate_identifier("batchId", &batch_id)?;

        let file_id = request
            .file_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty());
        if let Some(ref id) = file_id {
            validate_identifier("fileId", id)?;
        }

        let content_type = normalize_content_type(&file.content_type);
        self.validator
            .validate_all(&content_type, file.data.len())
            .map_err(|e| AppError::InvalidInput(e.to_string()))?;

        let batch = self
            .catalog
            .get_batch(&batch_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Batch {} not found", batch_id)))?;

        let photo_id = file_id.unwrap_or_else(|| Uuid::new_v4().to_string());
        tracing::Span::current().record("photo_id", photo_id.as_str());

        let original_filename = file.filename.as_deref().and_then(sanitize_filename);
        let extension = extension_for(original_filename.as_deref(), &content_type);
        let key = PhotoKey::new(&batch_id, &photo_id, extension);

        let original = self
            .storage
            .put_original(&key, &content_type, file.data.clone())
            .await
            .map_err(|e| upload_failed("store original", e))?;
        let thumbnail = self.store_thumbnail(&key, &content_type, file.data).await?;

        let uploaded_at = now_millis();
        let photo = Photo {
            id: photo_id,
            batch_id: batch.id,
            original_url: original.url,
            thumbnail_url: thumbnail.url,
            uploader_name: batch.uploader_name,
            comment: batch.comment,
            uploaded_at,
            order: uploaded_at,
            original_filename,
            storage_key: Some(original.key),
            deleted_at: None,
        };

        let photo = self.catalog.add_photo(&photo).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to persist photo");
            AppError::Upload(e.to_string())
        })?;

        tracing::info!(
            photo_id = %photo.id,
            batch_id = %photo.batch_id,
            "Photo uploaded"
        );

        self.hub.broadcast(&photo).await;
        Ok(photo)
    }

    async fn store_thumbnail(
        &self,
        key: &PhotoKey,
        content_type: &str,
        data: Bytes,
    ) -> Result<StoredObject, AppError> {
        if self.storage.derives_thumbnails() {
            return self
                .storage
                .put_thumbnail(key, content_type, Bytes::new())
                .await
                .map_err(|e| upload_failed("store thumbnail", e));
        }

        let generated = match self.thumbnails {
            Some(generator) => {
                let source = data.clone();
                match tokio::task::spawn_blocking(move || generator.generate(&source)).await {
                    Ok(Ok(thumbnail)) => Some(thumbnail),
                    Ok(Err(e)) => {
                        tracing::warn!(error = %e, "Thumbnail generation failed, using original");
                        None
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Thumbnail task failed, using original");
                        None
                    }
                }
            }
            None => None,
        };

        let result = match generated {
            Some(thumbnail) => {
                self.storage
                    .put_thumbnail(
                        &key.with_extension(Thumbnail::EXTENSION),
                        Thumbnail::CONTENT_TYPE,
                        thumbnail.data,
                    )
                    .await
            }
            None => self.storage.put_thumbnail(key, content_type, data).await,
        };

        result.map_err(|e| upload_failed("store thumbnail", e))
    }
}

fn upload_failed(step: &str, err: StorageError) -> AppError {
    tracing::error!(error = %err, step, "Storage upload failed");
    AppError::Upload(format!("{}: {}", step, err))
}

/// Lowercased media type without parameters.
fn normalize_content_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase()
}

/// Keep only the final path component and replace anything outside
/// `[A-Za-z0-9._-]` with `_`. Returns `None` when nothing usable is left.
pub fn sanitize_filename(filename: &str) -> Option<String> {
    let name = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename)
        .trim();

    if name.is_empty() || name.contains("..") {
        return None;
    }

    let sanitized: String = name
        .chars()
        .take(MAX_FILENAME_LENGTH)
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.trim_matches(['.', '_']).is_empty() {
        return None;
    }
    Some(sanitized)
}
