//! The batch/photo catalog seam.
//!
//! Handlers and services hold an `Arc<dyn PhotoCatalog>`. Every call is a fresh
//! round trip to the backing store; nothing is cached here.

use async_trait::async_trait;
use photowall_core::{
    models::{Batch, Photo},
    AppError,
};
use sqlx::PgPool;

use crate::db::{BatchRepository, PhotoRepository};

#[async_trait]
pub trait PhotoCatalog: Send + Sync {
    /// Insert a batch. A duplicate id fails with `AppError::AlreadyExists`.
    async fn create_batch(&self, batch: &Batch) -> Result<Batch, AppError>;

    async fn get_batch(&self, id: &str) -> Result<Option<Batch>, AppError>;

    /// Insert a photo. Fails with `AppError::Referential` when the batch is
    /// missing and `AppError::AlreadyExists` on a duplicate photo id.
    async fn add_photo(&self, photo: &Photo) -> Result<Photo, AppError>;

    async fn get_photo(&self, id: &str) -> Result<Option<Photo>, AppError>;

    /// Up to `limit` photos, newest upload first.
    async fn get_recent_photos(
        &self,
        limit: i64,
        include_deleted: bool,
    ) -> Result<Vec<Photo>, AppError>;

    async fn get_total_photo_count(&self, include_deleted: bool) -> Result<i64, AppError>;

    /// Photos of one batch ordered by `order` ascending.
    async fn get_batch_photos(
        &self,
        batch_id: &str,
        include_deleted: bool,
    ) -> Result<Vec<Photo>, AppError>;

    async fn update_photo_comment(
        &self,
        photo_id: &str,
        comment: Option<&str>,
    ) -> Result<Option<Photo>, AppError>;

    /// Write the deletion flag and the comment together. `Ok(None)` when the
    /// photo does not exist.
    async fn set_photo_deleted(
        &self,
        photo_id: &str,
        deleted: bool,
        comment: Option<&str>,
    ) -> Result<Option<Photo>, AppError>;

    /// All batches, newest first.
    async fn get_all_batches(&self) -> Result<Vec<Batch>, AppError>;

    /// Cheap round trip for readiness probes.
    async fn ping(&self) -> Result<(), AppError>;
}

/// Postgres-backed catalog
#[derive(Clone)]
pub struct PgCatalog {
    batches: BatchRepository,
    photos: PhotoRepository,
}

impl PgCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self {
            batches: BatchRepository::new(pool.clone()),
            photos: PhotoRepository::new(pool),
        }
    }
}

#[async_trait]
impl PhotoCatalog for PgCatalog {
    async fn create_batch(&self, batch: &Batch) -> Result<Batch, AppError> {
        self.batches.create_batch(batch).await
    }

    async fn get_batch(&self, id: &str) -> Result<Option<Batch>, AppError> {
        self.batches.get_batch(id).await
    }

    async fn add_photo(&self, photo: &Photo) -> Result<Photo, AppError> {
        self.photos.add_photo(photo).await
    }

    async fn get_photo(&self, id: &str) -> Result<Option<Photo>, AppError> {
        self.photos.get_photo(id).await
    }

    async fn get_recent_photos(
        &self,
        limit: i64,
        include_deleted: bool,
    ) -> Result<Vec<Photo>, AppError> {
        self.photos.get_recent_photos(limit, include_deleted).await
    }

    async fn get_total_photo_count(&self, include_deleted: bool) -> Result<i64, AppError> {
        self.photos.get_total_photo_count(include_deleted).await
    }

    async fn get_batch_photos(
        &self,
        batch_id: &str,
        include_deleted: bool,
    ) -> Result<Vec<Photo>, AppError> {
        self.photos.get_batch_photos(batch_id, include_deleted).await
    }

    async fn update_photo_comment(
        &self,
        photo_id: &str,
        comment: Option<&str>,
    ) -> Result<Option<Photo>, AppError> {
        self.photos.update_photo_comment(photo_id, comment).await
    }

    async fn set_photo_deleted(
        &self,
        photo_id: &str,
        deleted: bool,
        comment: Option<&str>,
    ) -> Result<Option<Photo>, AppError> {
        self.photos
            .set_photo_deleted(photo_id, deleted, comment, photowall_core::now_millis())
            .await
    }

    async fn get_all_batches(&self) -> Result<Vec<Batch>, AppError> {
        self.batches.get_all_batches().await
    }

    async fn ping(&self) -> Result<(), AppError> {
        self.photos.ping().await
    }
}
