use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{Batch, Photo};

/// Photo entry in a metadata export. Deleted photos never appear here.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExportPhoto {
    pub id: String,
    pub original_url: String,
    /// Stored filename, or `photo-{id}.jpg` when none was recorded
    pub original_filename: String,
    pub uploader_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub uploaded_at: i64,
    pub batch_id: String,
}

impl From<&Photo> for ExportPhoto {
    fn from(photo: &Photo) -> Self {
        Self {
            id: photo.id.clone(),
            original_url: photo.original_url.clone(),
            original_filename: photo.export_filename(),
            uploader_name: photo.uploader_name.clone(),
            comment: photo.effective_comment().map(String::from),
            uploaded_at: photo.uploaded_at,
            batch_id: photo.batch_id.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BatchExport {
    pub batch: Batch,
    pub photos: Vec<ExportPhoto>,
}

/// Either a single batch's photos or every batch with at least one live photo.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum ExportResponse {
    Photos {
        success: bool,
        photos: Vec<ExportPhoto>,
    },
    Batches {
        success: bool,
        batches: Vec<BatchExport>,
    },
}
