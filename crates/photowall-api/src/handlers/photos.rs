use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use photowall_core::models::ListPhotosResponse;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

/// Query parameters are kept as raw strings and parsed leniently, so a
/// malformed value falls back to its default instead of failing the request.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListPhotosQuery {
    /// Maximum number of photos (default 100)
    pub limit: Option<String>,
    /// `true` to include soft-deleted photos
    pub include_deleted: Option<String>,
}

impl ListPhotosQuery {
    fn limit(&self, default: i64, max: i64) -> i64 {
        self.limit
            .as_deref()
            .and_then(|v| v.trim().parse::<i64>().ok())
            .filter(|v| *v > 0)
            .unwrap_or(default)
            .min(max)
    }

    fn include_deleted(&self) -> bool {
        self.include_deleted
            .as_deref()
            .is_some_and(|v| v.eq_ignore_ascii_case("true"))
    }
}

/// List the most recent photos
#[utoipa::path(
    get,
    path = "/photos",
    tag = "photos",
    params(ListPhotosQuery),
    responses(
        (status = 200, description = "Recent photos, newest first", body = ListPhotosResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, query), fields(operation = "list_photos"))]
pub async fn list_photos(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListPhotosQuery>,
) -> Result<Json<ListPhotosResponse>, HttpAppError> {
    let limit = query.limit(
        state.config.photos_default_limit(),
        state.config.photos_max_limit(),
    );
    let include_deleted = query.include_deleted();

    let photos = state
        .catalog
        .get_recent_photos(limit, include_deleted)
        .await?;
    let total_count = state.catalog.get_total_photo_count(include_deleted).await?;

    tracing::debug!(returned = photos.len(), total_count, "Photos listed");

    Ok(Json(ListPhotosResponse {
        photos,
        total_count,
        success: true,
    }))
}
