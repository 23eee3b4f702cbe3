use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    response::sse::{Event, Sse},
};
use futures::stream::{self, Stream, StreamExt};

use crate::services::broadcast::{initial_frames, ChannelSink, StreamFrame, Subscription};
use crate::state::AppState;

const KEEP_ALIVE_COMMENT: &str = "keep-alive";

fn to_sse_event(frame: StreamFrame) -> Result<Event, axum::Error> {
    match frame {
        StreamFrame::Event(event) => Event::default().json_data(event),
        StreamFrame::Heartbeat => Ok(Event::default().comment(KEEP_ALIVE_COMMENT)),
    }
}

/// Live photo feed
///
/// Sends the visible photo count and the most recent photos (oldest first),
/// then a `photo` and a `totalCount` event for every upload, with `: keep-alive`
/// comments in between.
#[utoipa::path(
    get,
    path = "/photos/stream",
    tag = "photos",
    responses(
        (status = 200, description = "Server-sent event stream", content_type = "text/event-stream", body = String)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "stream_photos"))]
pub async fn stream_photos(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let (sink, rx) = ChannelSink::channel(state.config.stream_buffer_size());

    // Register before loading the snapshot so no upload falls in between
    let subscription = Subscription::open(
        Arc::clone(&state.hub),
        Arc::new(sink),
        Duration::from_secs(state.config.stream_heartbeat_secs()),
    );
    tracing::info!(subscriber_id = subscription.id(), "Live stream opened");

    let initial = initial_frames(state.catalog.as_ref(), state.config.stream_snapshot_size()).await;

    // The subscription lives in the stream state: dropping the body (client
    // disconnect) drops it and unregisters the subscriber.
    let live = stream::unfold((rx, subscription), |(mut rx, subscription)| async move {
        rx.recv().await.map(|frame| (frame, (rx, subscription)))
    });

    Sse::new(stream::iter(initial).chain(live).map(to_sse_event))
}

#[cfg(test)]
mod tests {
    use super::*;
    use photowall_core::models::StreamEvent;

    #[test]
    fn test_frames_convert_to_events() {
        assert!(to_sse_event(StreamFrame::Heartbeat).is_ok());
        assert!(to_sse_event(StreamFrame::Event(StreamEvent::TotalCount { count: 3 })).is_ok());
    }
}
