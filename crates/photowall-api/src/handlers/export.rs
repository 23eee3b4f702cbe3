use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use photowall_core::models::{validate_identifier, BatchExport, ExportPhoto, ExportResponse};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::error::{ErrorResponse, HttpAppError};
use crate::services::archive::ArchiveService;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ExportQuery {
    /// Restrict the export to one batch
    pub batch_id: Option<String>,
}

impl ExportQuery {
    fn batch_id(&self) -> Option<&str> {
        self.batch_id.as_deref().map(str::trim).filter(|id| !id.is_empty())
    }
}

/// Export photo metadata
///
/// With `batchId`, returns that batch's visible photos. Without it, returns
/// every batch that still has visible photos, newest batch first.
#[utoipa::path(
    get,
    path = "/photos/export",
    tag = "export",
    params(ExportQuery),
    responses(
        (status = 200, description = "Export data", body = ExportResponse),
        (status = 400, description = "Invalid batchId", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, query), fields(operation = "export_photos", batch_id = ?query.batch_id))]
pub async fn export_photos(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ExportQuery>,
) -> Result<Json<ExportResponse>, HttpAppError> {
    if let Some(batch_id) = query.batch_id() {
        validate_identifier("batchId", batch_id)?;
        let photos = state.catalog.get_batch_photos(batch_id, false).await?;
        return Ok(Json(ExportResponse::Photos {
            success: true,
            photos: photos.iter().map(ExportPhoto::from).collect(),
        }));
    }

    let mut batches = Vec::new();
    for batch in state.catalog.get_all_batches().await? {
        let photos = state.catalog.get_batch_photos(&batch.id, false).await?;
        if photos.is_empty() {
            continue;
        }
        batches.push(BatchExport {
            batch,
            photos: photos.iter().map(ExportPhoto::from).collect(),
        });
    }

    tracing::debug!(batches = batches.len(), "Export assembled");
    Ok(Json(ExportResponse::Batches {
        success: true,
        batches,
    }))
}

/// Download photos as a zip archive
///
/// One folder per batch named `{uploader} - {YYYY-MM-DD}`, each holding a
/// `metadata.json` and the original files.
#[utoipa::path(
    get,
    path = "/photos/export/archive",
    tag = "export",
    params(ExportQuery),
    responses(
        (status = 200, description = "Zip archive", content_type = "application/zip", body = Vec<u8>),
        (status = 400, description = "Invalid batchId", body = ErrorResponse),
        (status = 404, description = "Batch not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, query), fields(operation = "export_archive", batch_id = ?query.batch_id))]
pub async fn export_archive(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ExportQuery>,
) -> Result<Response, HttpAppError> {
    let archive = ArchiveService::new(Arc::clone(&state.catalog), Arc::clone(&state.storage))
        .build(query.batch_id())
        .await?;

    let disposition = format!("attachment; filename=\"{}\"", archive.filename);
    Ok((
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        archive.data,
    )
        .into_response())
}
