use std::sync::Arc;

use photowall_core::models::{validate_identifier, Batch, CreateBatchRequest};
use photowall_core::AppError;
use photowall_db::PhotoCatalog;
use validator::Validate;

/// Result of an idempotent batch create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome {
    pub batch: Batch,
    /// True when the id was already taken and the stored batch is returned
    pub existing: bool,
}

pub struct BatchService {
    catalog: Arc<dyn PhotoCatalog>,
}

impl BatchService {
    pub fn new(catalog: Arc<dyn PhotoCatalog>) -> Self {
        Self { catalog }
    }

    /// Create a batch, or return the stored one when the id already exists.
    ///
    /// The lookup before the insert is not atomic. A concurrent create that
    /// wins the race makes the insert fail with `AlreadyExists`, and the
    /// winner's row is returned instead.
    #[tracing::instrument(skip(self, request), fields(batch_id = %request.batch_id))]
    pub async fn create_batch(&self, request: CreateBatchRequest) -> Result<BatchOutcome, AppError> {
        request.validate()?;
        validate_identifier("batchId", &request.batch_id)?;

        if let Some(batch) = self.catalog.get_batch(&request.batch_id).await? {
            tracing::debug!("Batch already exists");
            return Ok(BatchOutcome {
                batch,
                existing: true,
            });
        }

        let comment = request
            .comment
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        let batch = Batch::new(
            request.batch_id.clone(),
            request.uploader_name.trim().to_string(),
            comment,
        );

        match self.catalog.create_batch(&batch).await {
            Ok(batch) => {
                tracing::info!(uploader = %batch.uploader_name, "Batch created");
                Ok(BatchOutcome {
                    batch,
                    existing: false,
                })
            }
            Err(AppError::AlreadyExists(_)) => {
                tracing::debug!("Lost batch creation race, returning stored batch");
                let batch = self.catalog.get_batch(&batch.id).await?.ok_or_else(|| {
                    AppError::Internal(format!("Batch {} vanished after conflict", batch.id))
                })?;
                Ok(BatchOutcome {
                    batch,
                    existing: true,
                })
            }
            Err(e) => Err(e),
        }
    }
}
