use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use bytes::BytesMut;
use photowall_core::{models::PhotoResponse, AppError};
use photowall_processing::ValidationError;

use crate::error::{ErrorResponse, HttpAppError};
use crate::services::upload::{UploadRequest, UploadService, UploadedFile};
use crate::state::AppState;

fn file_too_large(size: usize, max: usize) -> AppError {
    AppError::InvalidInput(ValidationError::FileTooLarge { size, max }.to_string())
}

/// Body-limit rejections surface as the same size error the validator gives.
fn multipart_error(context: &str, err: MultipartError, read: usize, max: usize) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return file_too_large(read, max);
    }
    AppError::InvalidInput(format!("{}: {}", context, err))
}

/// Read the `file`, `batchId` and `fileId` parts. Unknown parts are ignored.
///
/// The file is read chunk by chunk and rejected as soon as it passes
/// `max_file_size`.
async fn read_upload_form(
    mut multipart: Multipart,
    max_file_size: usize,
) -> Result<UploadRequest, AppError> {
    let mut request = UploadRequest::default();
    let mut read = 0usize;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error("Failed to read multipart", e, read, max_file_size))?
    {
        let field_name = field.name().map(|s| s.to_string()).unwrap_or_default();

        match field_name.as_str() {
            "file" => {
                if request.file.is_some() {
                    return Err(AppError::InvalidInput(
                        "Multiple file fields are not allowed; send exactly one field named 'file'"
                            .to_string(),
                    ));
                }
                let filename = field.file_name().map(|s| s.to_string());
                let content_type = field
                    .content_type()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "application/octet-stream".to_string());

                let mut data = BytesMut::new();
                while let Some(chunk) = field.chunk().await.map_err(|e| {
                    multipart_error("Failed to read file data", e, read, max_file_size)
                })? {
                    read += chunk.len();
                    if data.len() + chunk.len() > max_file_size {
                        return Err(file_too_large(data.len() + chunk.len(), max_file_size));
                    }
                    data.extend_from_slice(&chunk);
                }

                request.file = Some(UploadedFile {
                    data: data.freeze(),
                    filename,
                    content_type,
                });
            }
            "batchId" | "fileId" => {
                let value = field.text().await.map_err(|e| {
                    multipart_error(
                        &format!("Failed to read field {}", field_name),
                        e,
                        read,
                        max_file_size,
                    )
                })?;
                read += value.len();
                if field_name == "batchId" {
                    request.batch_id = Some(value);
                } else {
                    request.file_id = Some(value);
                }
            }
            _ => {}
        }
    }

    Ok(request)
}

/// Upload one photo into an existing batch
///
/// The photo is stored, persisted and pushed to every open live stream before
/// the response is sent.
#[utoipa::path(
    post,
    path = "/upload",
    tag = "photos",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Photo uploaded", body = PhotoResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 404, description = "Batch not found", body = ErrorResponse),
        (status = 500, description = "Upload failed", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(operation = "upload_photo"))]
pub async fn upload_photo(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<PhotoResponse>, HttpAppError> {
    let max_file_size = state.uploads.validator.max_file_size();
    let request = read_upload_form(multipart, max_file_size).await?;
    let photo = UploadService::new(&state).handle_upload(request).await?;

    Ok(Json(PhotoResponse {
        success: true,
        photo,
    }))
}
