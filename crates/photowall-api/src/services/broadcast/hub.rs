use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use photowall_core::models::{Photo, StreamEvent};
use photowall_db::PhotoCatalog;

use super::sink::{EventSink, StreamFrame};

pub type SubscriberId = u64;

/// Outcome of one broadcast.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Subscribers that received every frame
    pub delivered: usize,
    /// Subscribers removed because a send failed
    pub dropped: usize,
}

/// Registry of live stream subscribers.
///
/// The lock is only held to insert, remove or snapshot entries; frames are
/// sent outside of it.
pub struct BroadcastHub {
    catalog: Arc<dyn PhotoCatalog>,
    subscribers: Mutex<HashMap<SubscriberId, Arc<dyn EventSink>>>,
    next_id: AtomicU64,
}

impl BroadcastHub {
    pub fn new(catalog: Arc<dyn PhotoCatalog>) -> Self {
        Self {
            catalog,
            subscribers: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<SubscriberId, Arc<dyn EventSink>>> {
        // The map stays consistent even if a holder panicked
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn subscribe(&self, sink: Arc<dyn EventSink>) -> SubscriberId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let total = {
            let mut subscribers = self.lock();
            subscribers.insert(id, sink);
            subscribers.len()
        };
        tracing::debug!(subscriber_id = id, subscribers = total, "Stream subscriber added");
        id
    }

    /// Remove a subscriber. Returns false when it was already gone.
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        let removed = self.lock().remove(&id).is_some();
        if removed {
            tracing::debug!(subscriber_id = id, "Stream subscriber removed");
        }
        removed
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().len()
    }

    /// Send a frame to a single subscriber, removing it when the send fails.
    pub fn send_to(&self, id: SubscriberId, frame: &StreamFrame) -> bool {
        let sink = self.lock().get(&id).cloned();
        let Some(sink) = sink else {
            return false;
        };
        if sink.send(frame).is_err() {
            self.unsubscribe(id);
            return false;
        }
        true
    }

    /// Fan a new photo out to every subscriber, followed by the updated
    /// visible photo count.
    #[tracing::instrument(skip(self, photo), fields(photo_id = %photo.id))]
    pub async fn broadcast(&self, photo: &Photo) -> BroadcastReport {
        let count = match self.catalog.get_total_photo_count(false).await {
            Ok(count) => Some(count),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to count photos for broadcast");
                None
            }
        };

        let photo_frame = StreamFrame::Event(StreamEvent::Photo(photo.clone()));
        let count_frame = count.map(|count| StreamFrame::Event(StreamEvent::TotalCount { count }));

        let snapshot: Vec<(SubscriberId, Arc<dyn EventSink>)> = self
            .lock()
            .iter()
            .map(|(id, sink)| (*id, Arc::clone(sink)))
            .collect();

        let mut report = BroadcastReport::default();
        for (id, sink) in snapshot {
            let sent = sink.send(&photo_frame).is_ok()
                && count_frame
                    .as_ref()
                    .map_or(true, |frame| sink.send(frame).is_ok());
            if sent {
                report.delivered += 1;
            } else {
                self.unsubscribe(id);
                report.dropped += 1;
            }
        }

        tracing::info!(
            delivered = report.delivered,
            dropped = report.dropped,
            "Photo broadcast"
        );
        report
    }

    /// Drop every subscriber. Their streams end once buffered frames drain.
    pub fn clear(&self) {
        let removed = {
            let mut subscribers = self.lock();
            let removed = subscribers.len();
            subscribers.clear();
            removed
        };
        tracing::info!(removed, "Stream subscribers cleared");
    }
}
