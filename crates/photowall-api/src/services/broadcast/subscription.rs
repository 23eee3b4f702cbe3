use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::hub::{BroadcastHub, SubscriberId};
use super::sink::{EventSink, StreamFrame};

/// A registered stream subscriber together with its heartbeat task.
///
/// Dropping the subscription cancels the heartbeat and unregisters the sink,
/// so tying it to the response body stream cleans up on client disconnect.
pub struct Subscription {
    id: SubscriberId,
    hub: Arc<BroadcastHub>,
    cancel: CancellationToken,
    heartbeat: JoinHandle<()>,
}

impl Subscription {
    /// Register `sink` with the hub and start sending heartbeats every `period`.
    pub fn open(hub: Arc<BroadcastHub>, sink: Arc<dyn EventSink>, period: Duration) -> Self {
        let id = hub.subscribe(sink);
        let cancel = CancellationToken::new();
        let heartbeat = tokio::spawn(run_heartbeat(
            Arc::clone(&hub),
            id,
            period,
            cancel.clone(),
        ));

        Self {
            id,
            hub,
            cancel,
            heartbeat,
        }
    }

    pub fn id(&self) -> SubscriberId {
        self.id
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn heartbeat_finished(&self) -> bool {
        self.heartbeat.is_finished()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel.cancel();
        self.hub.unsubscribe(self.id);
    }
}

async fn run_heartbeat(
    hub: Arc<BroadcastHub>,
    id: SubscriberId,
    period: Duration,
    cancel: CancellationToken,
) {
    let period = period.max(Duration::from_millis(1));
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                // send_to unregisters the subscriber when the send fails
                if !hub.send_to(id, &StreamFrame::Heartbeat) {
                    tracing::debug!(subscriber_id = id, "Heartbeat failed, stopping");
                    break;
                }
            }
        }
    }
}
