use photowall_core::models::StreamEvent;
use tokio::sync::mpsc;

/// One unit written to a live stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamFrame {
    /// A `data:` frame carrying a JSON event
    Event(StreamEvent),
    /// A comment frame that keeps idle connections open
    Heartbeat,
}

/// The sink can no longer accept frames and should be dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("event sink closed")]
pub struct SinkClosed;

/// Destination for stream frames of one subscriber.
///
/// `send` must never block: the hub calls it for every subscriber in turn.
pub trait EventSink: Send + Sync {
    fn send(&self, frame: &StreamFrame) -> Result<(), SinkClosed>;
}

/// Sink backed by a bounded channel that feeds an SSE response body.
///
/// A full buffer means the client stopped reading, so it fails the send just
/// like a closed channel does.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::Sender<StreamFrame>,
}

impl ChannelSink {
    pub fn channel(buffer: usize) -> (Self, mpsc::Receiver<StreamFrame>) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        (Self { tx }, rx)
    }
}

impl EventSink for ChannelSink {
    fn send(&self, frame: &StreamFrame) -> Result<(), SinkClosed> {
        self.tx.try_send(frame.clone()).map_err(|_| SinkClosed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_buffer_fails_send() {
        let (sink, mut rx) = ChannelSink::channel(1);
        assert!(sink.send(&StreamFrame::Heartbeat).is_ok());
        assert_eq!(sink.send(&StreamFrame::Heartbeat), Err(SinkClosed));

        assert_eq!(rx.try_recv().ok(), Some(StreamFrame::Heartbeat));
        assert!(sink.send(&StreamFrame::Heartbeat).is_ok());
    }

    #[test]
    fn test_closed_receiver_fails_send() {
        let (sink, rx) = ChannelSink::channel(4);
        drop(rx);
        assert_eq!(sink.send(&StreamFrame::Heartbeat), Err(SinkClosed));
    }
}
