//! In-memory `PhotoCatalog` for tests.
//!
//! Mirrors the Postgres semantics: duplicate ids fail with `AlreadyExists`,
//! photos for unknown batches fail with `Referential`, and orderings match the
//! SQL `ORDER BY` clauses including their tie-breakers.

use std::collections::HashMap;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Mutex, MutexGuard,
};

use async_trait::async_trait;
use photowall_core::{
    models::{Batch, Photo},
    now_millis, AppError,
};

use crate::catalog::PhotoCatalog;

#[derive(Default)]
struct Tables {
    batches: HashMap<String, Batch>,
    photos: HashMap<String, Photo>,
}

#[derive(Default)]
pub struct InMemoryCatalog {
    tables: Mutex<Tables>,
    unavailable: AtomicBool,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail as if the database were down.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>, AppError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::Database(sqlx::Error::PoolClosed));
        }
        Ok(self.tables.lock().unwrap_or_else(|e| e.into_inner()))
    }
}

#[async_trait]
impl PhotoCatalog for InMemoryCatalog {
    async fn create_batch(&self, batch: &Batch) -> Result<Batch, AppError> {
        let mut tables = self.tables()?;
        if tables.batches.contains_key(&batch.id) {
            return Err(AppError::AlreadyExists(format!(
                "Batch {} already exists",
                batch.id
            )));
        }
        tables.batches.insert(batch.id.clone(), batch.clone());
        Ok(batch.clone())
    }

    async fn get_batch(&self, id: &str) -> Result<Option<Batch>, AppError> {
        Ok(self.tables()?.batches.get(id).cloned())
    }

    async fn add_photo(&self, photo: &Photo) -> Result<Photo, AppError> {
        let mut tables = self.tables()?;
        if !tables.batches.contains_key(&photo.batch_id) {
            return Err(AppError::Referential(format!(
                "Photo {} references a missing batch",
                photo.id
            )));
        }
        if tables.photos.contains_key(&photo.id) {
            return Err(AppError::AlreadyExists(format!(
                "Photo {} already exists",
                photo.id
            )));
        }
        tables.photos.insert(photo.id.clone(), photo.clone());
        Ok(photo.clone())
    }

    async fn get_photo(&self, id: &str) -> Result<Option<Photo>, AppError> {
        Ok(self.tables()?.photos.get(id).cloned())
    }

    async fn get_recent_photos(
        &self,
        limit: i64,
        include_deleted: bool,
    ) -> Result<Vec<Photo>, AppError> {
        let tables = self.tables()?;
        let mut photos: Vec<Photo> = tables
            .photos
            .values()
            .filter(|p| include_deleted || !p.is_deleted())
            .cloned()
            .collect();
        photos.sort_by(|a, b| {
            b.uploaded_at
                .cmp(&a.uploaded_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        photos.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(photos)
    }

    async fn get_total_photo_count(&self, include_deleted: bool) -> Result<i64, AppError> {
        let tables = self.tables()?;
        let count = tables
            .photos
            .values()
            .filter(|p| include_deleted || !p.is_deleted())
            .count();
        Ok(count as i64)
    }

    async fn get_batch_photos(
        &self,
        batch_id: &str,
        include_deleted: bool,
    ) -> Result<Vec<Photo>, AppError> {
        let tables = self.tables()?;
        let mut photos: Vec<Photo> = tables
            .photos
            .values()
            .filter(|p| p.batch_id == batch_id && (include_deleted || !p.is_deleted()))
            .cloned()
            .collect();
        photos.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.id.cmp(&b.id)));
        Ok(photos)
    }

    async fn update_photo_comment(
        &self,
        photo_id: &str,
        comment: Option<&str>,
    ) -> Result<Option<Photo>, AppError> {
        let mut tables = self.tables()?;
        Ok(tables.photos.get_mut(photo_id).map(|photo| {
            photo.comment = comment.map(String::from);
            photo.clone()
        }))
    }

    async fn set_photo_deleted(
        &self,
        photo_id: &str,
        deleted: bool,
        comment: Option<&str>,
    ) -> Result<Option<Photo>, AppError> {
        let mut tables = self.tables()?;
        Ok(tables.photos.get_mut(photo_id).map(|photo| {
            photo.set_deleted(deleted, comment.map(String::from), now_millis());
            photo.clone()
        }))
    }

    async fn get_all_batches(&self) -> Result<Vec<Batch>, AppError> {
        let tables = self.tables()?;
        let mut batches: Vec<Batch> = tables.batches.values().cloned().collect();
        batches.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then_with(|| a.id.cmp(&b.id)));
        Ok(batches)
    }

    async fn ping(&self) -> Result<(), AppError> {
        self.tables().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(id: &str, timestamp: i64) -> Batch {
        Batch {
            id: id.to_string(),
            uploader_name: "Alice".to_string(),
            comment: Some("party".to_string()),
            timestamp,
        }
    }

    fn photo(id: &str, batch_id: &str, uploaded_at: i64) -> Photo {
        Photo {
            id: id.to_string(),
            batch_id: batch_id.to_string(),
            original_url: format!("https://cdn.example.com/photos/{}/{}.jpg", batch_id, id),
            thumbnail_url: format!("https://cdn.example.com/thumbnails/{}/{}.jpg", batch_id, id),
            uploader_name: "Alice".to_string(),
            comment: None,
            uploaded_at,
            order: uploaded_at,
            original_filename: None,
            storage_key: Some(format!("photos/{}/{}.jpg", batch_id, id)),
            deleted_at: None,
        }
    }

    async fn seeded() -> InMemoryCatalog {
        let catalog = InMemoryCatalog::new();
        catalog.create_batch(&batch("B1", 100)).await.unwrap();
        catalog.create_batch(&batch("B2", 200)).await.unwrap();
        for (i, id) in ["P1", "P2", "P3", "P4", "P5"].iter().enumerate() {
            let batch_id = if i % 2 == 0 { "B1" } else { "B2" };
            catalog
                .add_photo(&photo(id, batch_id, 1_000 + i as i64))
                .await
                .unwrap();
        }
        catalog
    }

    #[tokio::test]
    async fn test_duplicate_batch_is_already_exists() {
        let catalog = InMemoryCatalog::new();
        catalog.create_batch(&batch("B1", 100)).await.unwrap();
        let err = catalog.create_batch(&batch("B1", 300)).await.unwrap_err();
        assert!(matches!(err, AppError::AlreadyExists(_)));
        assert_eq!(catalog.get_batch("B1").await.unwrap().unwrap().timestamp, 100);
    }

    #[tokio::test]
    async fn test_batches_newest_first_ties_by_id() {
        let catalog = InMemoryCatalog::new();
        catalog.create_batch(&batch("B3", 100)).await.unwrap();
        catalog.create_batch(&batch("B1", 100)).await.unwrap();
        catalog.create_batch(&batch("B9", 200)).await.unwrap();

        let ids: Vec<String> = catalog
            .get_all_batches()
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.id)
            .collect();
        assert_eq!(ids, vec!["B9", "B1", "B3"]);
    }

    #[tokio::test]
    async fn test_photo_for_missing_batch_is_referential() {
        let catalog = InMemoryCatalog::new();
        let err = catalog.add_photo(&photo("P1", "nope", 1)).await.unwrap_err();
        assert!(matches!(err, AppError::Referential(_)));
        assert!(catalog.get_photo("P1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_non_deleted_listing_is_filtered_subset() {
        let catalog = seeded().await;
        catalog.set_photo_deleted("P2", true, None).await.unwrap();
        catalog.set_photo_deleted("P4", true, None).await.unwrap();

        let all = catalog.get_recent_photos(100, true).await.unwrap();
        let live = catalog.get_recent_photos(100, false).await.unwrap();

        assert_eq!(all.len(), 5);
        assert_eq!(live.len(), 3);
        assert!(live.iter().all(|p| !p.is_deleted()));
        assert!(live.iter().all(|p| all.contains(p)));
        assert_eq!(
            all.iter().filter(|p| !p.is_deleted()).count(),
            live.len()
        );
        assert_eq!(catalog.get_total_photo_count(false).await.unwrap(), 3);
        assert_eq!(catalog.get_total_photo_count(true).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_recent_photos_newest_first_and_limited() {
        let catalog = seeded().await;
        let recent = catalog.get_recent_photos(2, false).await.unwrap();
        let ids: Vec<&str> = recent.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["P5", "P4"]);
        assert!(catalog.get_recent_photos(0, false).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_batch_photos_in_order() {
        let catalog = seeded().await;
        let photos = catalog.get_batch_photos("B1", false).await.unwrap();
        assert_eq!(photos.len(), 3);
        assert!(photos.windows(2).all(|w| w[0].order <= w[1].order));
        assert!(photos.iter().all(|p| p.batch_id == "B1"));
    }

    #[tokio::test]
    async fn test_toggle_round_trip_keeps_comment() {
        let catalog = seeded().await;
        catalog.update_photo_comment("P1", Some("cake")).await.unwrap();

        let deleted = catalog
            .set_photo_deleted("P1", true, Some("cake"))
            .await
            .unwrap()
            .unwrap();
        assert!(deleted.is_deleted());
        assert_eq!(deleted.effective_comment(), Some("cake"));

        let restored = catalog
            .set_photo_deleted("P1", false, Some("cake"))
            .await
            .unwrap()
            .unwrap();
        assert!(!restored.is_deleted());
        assert_eq!(restored.effective_comment(), Some("cake"));

        assert!(catalog
            .set_photo_deleted("missing", true, None)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_batches_newest_first() {
        let catalog = seeded().await;
        let ids: Vec<String> = catalog
            .get_all_batches()
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.id)
            .collect();
        assert_eq!(ids, vec!["B2".to_string(), "B1".to_string()]);
    }

    #[tokio::test]
    async fn test_unavailable_fails_every_call() {
        let catalog = seeded().await;
        catalog.set_unavailable(true);
        assert!(matches!(
            catalog.get_total_photo_count(false).await,
            Err(AppError::Database(_))
        ));
        assert!(catalog.ping().await.is_err());
        catalog.set_unavailable(false);
        assert!(catalog.ping().await.is_ok());
    }
}
