use photowall_core::{models::Photo, AppError};
use sqlx::{PgPool, Postgres};

use super::map_insert_error;

const PHOTO_COLUMNS: &str = "id, batch_id, original_url, thumbnail_url, uploader_name, comment, \
     uploaded_at, order_index, original_filename, storage_key, deleted_at";

/// Repository for photos
#[derive(Clone)]
pub struct PhotoRepository {
    pool: PgPool,
}

impl PhotoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a photo. The batch must already exist.
    #[tracing::instrument(skip(self, photo), fields(db.table = "photos", db.operation = "insert", db.record_id = %photo.id, batch_id = %photo.batch_id))]
    pub async fn add_photo(&self, photo: &Photo) -> Result<Photo, AppError> {
        let query = format!(
            r#"
            INSERT INTO photos (id, batch_id, original_url, thumbnail_url, uploader_name, comment,
                                uploaded_at, order_index, original_filename, storage_key, deleted_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {}
            "#,
            PHOTO_COLUMNS
        );

        sqlx::query_as::<Postgres, Photo>(&query)
            .bind(&photo.id)
            .bind(&photo.batch_id)
            .bind(&photo.original_url)
            .bind(&photo.thumbnail_url)
            .bind(&photo.uploader_name)
            .bind(&photo.comment)
            .bind(photo.uploaded_at)
            .bind(photo.order)
            .bind(&photo.original_filename)
            .bind(&photo.storage_key)
            .bind(photo.deleted_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_insert_error(e, "Photo", &photo.id))
    }

    #[tracing::instrument(skip(self), fields(db.table = "photos", db.operation = "select", db.record_id = %id))]
    pub async fn get_photo(&self, id: &str) -> Result<Option<Photo>, AppError> {
        let query = format!("SELECT {} FROM photos WHERE id = $1", PHOTO_COLUMNS);
        let photo = sqlx::query_as::<Postgres, Photo>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(photo)
    }

    /// Most recent photos first
    #[tracing::instrument(skip(self), fields(db.table = "photos", db.operation = "select"))]
    pub async fn get_recent_photos(
        &self,
        limit: i64,
        include_deleted: bool,
    ) -> Result<Vec<Photo>, AppError> {
        let query = format!(
            "SELECT {} FROM photos WHERE ($2 OR deleted_at IS NULL) \
             ORDER BY uploaded_at DESC, id DESC LIMIT $1",
            PHOTO_COLUMNS
        );
        let photos = sqlx::query_as::<Postgres, Photo>(&query)
            .bind(limit.max(0))
            .bind(include_deleted)
            .fetch_all(&self.pool)
            .await?;

        Ok(photos)
    }

    #[tracing::instrument(skip(self), fields(db.table = "photos", db.operation = "count"))]
    pub async fn get_total_photo_count(&self, include_deleted: bool) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<Postgres, i64>(
            "SELECT COUNT(*) FROM photos WHERE ($1 OR deleted_at IS NULL)",
        )
        .bind(include_deleted)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// Photos of one batch in upload order
    #[tracing::instrument(skip(self), fields(db.table = "photos", db.operation = "select", batch_id = %batch_id))]
    pub async fn get_batch_photos(
        &self,
        batch_id: &str,
        include_deleted: bool,
    ) -> Result<Vec<Photo>, AppError> {
        let query = format!(
            "SELECT {} FROM photos WHERE batch_id = $1 AND ($2 OR deleted_at IS NULL) \
             ORDER BY order_index ASC, id ASC",
            PHOTO_COLUMNS
        );
        let photos = sqlx::query_as::<Postgres, Photo>(&query)
            .bind(batch_id)
            .bind(include_deleted)
            .fetch_all(&self.pool)
            .await?;

        Ok(photos)
    }

    #[tracing::instrument(skip(self, comment), fields(db.table = "photos", db.operation = "update", db.record_id = %photo_id))]
    pub async fn update_photo_comment(
        &self,
        photo_id: &str,
        comment: Option<&str>,
    ) -> Result<Option<Photo>, AppError> {
        let query = format!(
            "UPDATE photos SET comment = $2 WHERE id = $1 RETURNING {}",
            PHOTO_COLUMNS
        );
        let photo = sqlx::query_as::<Postgres, Photo>(&query)
            .bind(photo_id)
            .bind(comment)
            .fetch_optional(&self.pool)
            .await?;

        Ok(photo)
    }

    /// Flip the deletion flag and write the comment in one statement.
    ///
    /// Deleting keeps the first deletion instant and falls back to the stored
    /// comment when none is given. Restoring writes `comment` verbatim.
    #[tracing::instrument(skip(self, comment), fields(db.table = "photos", db.operation = "update", db.record_id = %photo_id, deleted))]
    pub async fn set_photo_deleted(
        &self,
        photo_id: &str,
        deleted: bool,
        comment: Option<&str>,
        now: i64,
    ) -> Result<Option<Photo>, AppError> {
        let query = format!(
            r#"
            UPDATE photos
            SET deleted_at = CASE WHEN $2 THEN COALESCE(deleted_at, $3) ELSE NULL END,
                comment = CASE WHEN $2 THEN COALESCE($4, comment) ELSE $4 END
            WHERE id = $1
            RETURNING {}
            "#,
            PHOTO_COLUMNS
        );
        let photo = sqlx::query_as::<Postgres, Photo>(&query)
            .bind(photo_id)
            .bind(deleted)
            .bind(now)
            .bind(comment)
            .fetch_optional(&self.pool)
            .await?;

        Ok(photo)
    }

    #[tracing::instrument(skip(self), fields(db.operation = "ping"))]
    pub async fn ping(&self) -> Result<(), AppError> {
        sqlx::query_scalar::<Postgres, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(())
    }
}
