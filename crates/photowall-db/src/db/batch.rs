use photowall_core::{models::Batch, AppError};
use sqlx::{PgPool, Postgres};

use super::map_insert_error;

/// Repository for upload batches
#[derive(Clone)]
pub struct BatchRepository {
    pool: PgPool,
}

impl BatchRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new batch.
    ///
    /// Plain insert with no upsert: a duplicate id surfaces as
    /// `AppError::AlreadyExists` and the caller decides what that means.
    #[tracing::instrument(skip(self, batch), fields(db.table = "batches", db.operation = "insert", db.record_id = %batch.id))]
    pub async fn create_batch(&self, batch: &Batch) -> Result<Batch, AppError> {
        sqlx::query_as::<Postgres, Batch>(
            r#"
            INSERT INTO batches (id, uploader_name, comment, timestamp)
            VALUES ($1, $2, $3, $4)
            RETURNING id, uploader_name, comment, timestamp
            "#,
        )
        .bind(&batch.id)
        .bind(&batch.uploader_name)
        .bind(&batch.comment)
        .bind(batch.timestamp)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_insert_error(e, "Batch", &batch.id))
    }

    #[tracing::instrument(skip(self), fields(db.table = "batches", db.operation = "select", db.record_id = %id))]
    pub async fn get_batch(&self, id: &str) -> Result<Option<Batch>, AppError> {
        let batch = sqlx::query_as::<Postgres, Batch>(
            "SELECT id, uploader_name, comment, timestamp FROM batches WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(batch)
    }

    /// All batches, newest first
    #[tracing::instrument(skip(self), fields(db.table = "batches", db.operation = "select"))]
    pub async fn get_all_batches(&self) -> Result<Vec<Batch>, AppError> {
        let batches = sqlx::query_as::<Postgres, Batch>(
            "SELECT id, uploader_name, comment, timestamp FROM batches ORDER BY timestamp DESC, id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(batches)
    }
}
