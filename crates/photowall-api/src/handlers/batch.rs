use std::sync::Arc;

use axum::{extract::State, Json};
use photowall_core::models::{CreateBatchRequest, CreateBatchResponse};

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::services::batch::BatchService;
use crate::state::AppState;

/// Create an upload batch
///
/// Idempotent on `batchId`: repeating the call returns the stored batch with
/// `existing = true` instead of failing.
#[utoipa::path(
    post,
    path = "/batch",
    tag = "batches",
    request_body = CreateBatchRequest,
    responses(
        (status = 200, description = "Batch created or already present", body = CreateBatchResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, request), fields(operation = "create_batch", batch_id = %request.batch_id))]
pub async fn create_batch(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<CreateBatchRequest>,
) -> Result<Json<CreateBatchResponse>, HttpAppError> {
    let outcome = BatchService::new(Arc::clone(&state.catalog))
        .create_batch(request)
        .await?;

    Ok(Json(CreateBatchResponse {
        success: true,
        batch: outcome.batch,
        existing: outcome.existing,
    }))
}
