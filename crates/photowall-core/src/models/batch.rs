use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

/// A group of photos uploaded by one guest in one session.
///
/// The id is generated by the client and doubles as the idempotency key for
/// batch creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Batch {
    pub id: String,
    pub uploader_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Creation instant in milliseconds since the Unix epoch
    pub timestamp: i64,
}

impl Batch {
    pub fn new(id: String, uploader_name: String, comment: Option<String>) -> Self {
        Self {
            id,
            uploader_name,
            comment,
            timestamp: crate::now_millis(),
        }
    }
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBatchRequest {
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "batchId is required"))]
    pub batch_id: String,
    #[serde(default)]
    #[validate(
        custom(function = "not_blank", message = "uploaderName is required"),
        length(max = 100, message = "uploaderName must be at most 100 characters")
    )]
    pub uploader_name: String,
    #[serde(default)]
    #[validate(length(max = 1000, message = "comment must be at most 1000 characters"))]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateBatchResponse {
    pub success: bool,
    pub batch: Batch,
    /// True when the batch already existed and was returned unchanged
    pub existing: bool,
}
