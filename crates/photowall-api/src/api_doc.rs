//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use photowall_core::models;

/// Returns the OpenAPI document served at `/api/openapi.json`.
pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Photowall API",
        version = "0.1.0",
        description = "Event photo wall: guests upload photos in batches, a preview screen follows the live stream, organizers list, export and soft-delete photos."
    ),
    paths(
        handlers::batch::create_batch,
        handlers::upload::upload_photo,
        handlers::photos::list_photos,
        handlers::photo_delete::toggle_photo_deleted,
        handlers::export::export_photos,
        handlers::export::export_archive,
        handlers::stream::stream_photos,
    ),
    components(schemas(
        models::Batch,
        models::CreateBatchRequest,
        models::CreateBatchResponse,
        models::Photo,
        models::PhotoResponse,
        models::ListPhotosResponse,
        models::TogglePhotoDeletedRequest,
        models::TogglePhotoDeletedResponse,
        models::ExportPhoto,
        models::BatchExport,
        models::ExportResponse,
        error::ErrorResponse,
    )),
    tags(
        (name = "batches", description = "Upload sessions"),
        (name = "photos", description = "Upload, listing, soft delete and the live stream"),
        (name = "export", description = "Metadata and zip exports"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_lists_every_endpoint() {
        let spec = get_openapi_spec();
        for path in [
            "/batch",
            "/upload",
            "/photos",
            "/photos/delete",
            "/photos/export",
            "/photos/export/archive",
            "/photos/stream",
        ] {
            assert!(spec.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}
