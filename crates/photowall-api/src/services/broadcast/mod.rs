//! Live photo broadcast.
//!
//! Every open `/photos/stream` response owns a [`Subscription`] registered with
//! the shared [`BroadcastHub`]. Uploads call [`BroadcastHub::broadcast`], which
//! writes a `photo` frame followed by a `totalCount` frame to every subscriber.

pub mod hub;
pub mod sink;
pub mod subscription;

pub use hub::{BroadcastHub, BroadcastReport, SubscriberId};
pub use sink::{ChannelSink, EventSink, SinkClosed, StreamFrame};
pub use subscription::Subscription;

use photowall_core::models::StreamEvent;
use photowall_db::PhotoCatalog;

/// Frames a new subscriber sees before live events: the visible photo count,
/// then the `snapshot_size` most recent photos oldest first.
///
/// Lookup failures become `error` events so the stream can stay open.
pub async fn initial_frames(catalog: &dyn PhotoCatalog, snapshot_size: i64) -> Vec<StreamFrame> {
    let mut frames = Vec::new();

    match catalog.get_total_photo_count(false).await {
        Ok(count) => frames.push(StreamFrame::Event(StreamEvent::TotalCount { count })),
        Err(e) => {
            tracing::error!(error = %e, "Failed to count photos for stream");
            frames.push(StreamFrame::Event(StreamEvent::Error {
                message: "Failed to load photo count".to_string(),
            }));
        }
    }

    match catalog.get_recent_photos(snapshot_size, false).await {
        Ok(photos) => frames.extend(
            photos
                .into_iter()
                .rev()
                .map(|photo| StreamFrame::Event(StreamEvent::Photo(photo))),
        ),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load recent photos for stream");
            frames.push(StreamFrame::Event(StreamEvent::Error {
                message: "Failed to load recent photos".to_string(),
            }));
        }
    }

    frames
}

#[cfg(test)]
mod tests {
    use super::*;
    use photowall_core::models::{Batch, Photo};
    use photowall_db::InMemoryCatalog;

    fn photo(id: &str, uploaded_at: i64) -> Photo {
        Photo {
            id: id.to_string(),
            batch_id: "B1".to_string(),
            original_url: format!("https://cdn.example.com/photos/B1/{}.jpg", id),
            thumbnail_url: format!("https://cdn.example.com/thumbnails/B1/{}.jpg", id),
            uploader_name: "Alice".to_string(),
            comment: None,
            uploaded_at,
            order: uploaded_at,
            original_filename: None,
            storage_key: None,
            deleted_at: None,
        }
    }

    fn photo_ids(frames: &[StreamFrame]) -> Vec<String> {
        frames
            .iter()
            .filter_map(|frame| match frame {
                StreamFrame::Event(StreamEvent::Photo(p)) => Some(p.id.clone()),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_snapshot_is_oldest_first_and_limited() {
        let catalog = InMemoryCatalog::new();
        catalog
            .create_batch(&Batch::new("B1".to_string(), "Alice".to_string(), None))
            .await
            .unwrap();
        for (i, id) in ["P1", "P2", "P3"].iter().enumerate() {
            catalog.add_photo(&photo(id, 1_000 + i as i64)).await.unwrap();
        }
        catalog.set_photo_deleted("P3", true, None).await.unwrap();

        let frames = initial_frames(&catalog, 10).await;
        assert_eq!(
            frames[0],
            StreamFrame::Event(StreamEvent::TotalCount { count: 2 })
        );
        assert_eq!(photo_ids(&frames), vec!["P1", "P2"]);

        let frames = initial_frames(&catalog, 1).await;
        assert_eq!(photo_ids(&frames), vec!["P2"]);
    }

    #[tokio::test]
    async fn test_lookup_failure_yields_error_events() {
        let catalog = InMemoryCatalog::new();
        catalog.set_unavailable(true);

        let frames = initial_frames(&catalog, 10).await;
        assert_eq!(frames.len(), 2);
        assert!(frames
            .iter()
            .all(|f| matches!(f, StreamFrame::Event(StreamEvent::Error { .. }))));
    }
}
