use std::sync::Arc;

use axum::{extract::State, Json};
use photowall_core::{
    models::{TogglePhotoDeletedRequest, TogglePhotoDeletedResponse},
    AppError,
};

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;

/// Soft-delete or restore a photo
///
/// The photo's comment is written back unchanged, so restoring a photo keeps it.
#[utoipa::path(
    post,
    path = "/photos/delete",
    tag = "photos",
    request_body = TogglePhotoDeletedRequest,
    responses(
        (status = 200, description = "Deletion flag updated", body = TogglePhotoDeletedResponse),
        (status = 400, description = "photoId and deleted flag are required", body = ErrorResponse),
        (status = 404, description = "Photo not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, request), fields(operation = "toggle_photo_deleted"))]
pub async fn toggle_photo_deleted(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<TogglePhotoDeletedRequest>,
) -> Result<Json<TogglePhotoDeletedResponse>, HttpAppError> {
    let (photo_id, deleted) = match (request.photo_id, request.deleted) {
        (Some(id), Some(deleted)) if !id.trim().is_empty() => (id, deleted),
        _ => {
            return Err(AppError::InvalidInput(
                "photoId and deleted flag are required".to_string(),
            )
            .into())
        }
    };

    let photo = state
        .catalog
        .get_photo(&photo_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Photo not found".to_string()))?;

    state
        .catalog
        .set_photo_deleted(&photo.id, deleted, photo.effective_comment())
        .await?
        .ok_or_else(|| AppError::NotFound("Photo not found".to_string()))?;

    tracing::info!(photo_id = %photo_id, deleted, "Photo deletion flag updated");

    Ok(Json(TogglePhotoDeletedResponse {
        success: true,
        photo_id,
        deleted,
    }))
}
