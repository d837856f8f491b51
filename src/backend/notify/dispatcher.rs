/**
 * Change Event Dispatcher
 *
 * `notify` runs on the caller's task and does only bounded, send-independent
 * work: it checks the channel name against the hub, snapshots the entity,
 * serializes the event and pushes it onto an unbounded queue. Any failure
 * there is logged and the event is dropped.
 *
 * A consumer task started with the dispatcher pops each queued event and
 * spawns exactly one unit of work on the dispatcher's own worker pool that
 * broadcasts it on its channel. That unit in turn schedules the
 * per-connection sends on the channel's pool.
 */
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::backend::notify::ChangeNotifier;
use crate::backend::realtime::{ChannelHub, RealtimeError};
use crate::backend::worker::WorkerPool;
use crate::shared::{ChangeEvent, OperationKind, Snapshot};

/// A serialized event waiting for broadcast
struct QueuedEvent {
    channel: String,
    entity: &'static str,
    operation: OperationKind,
    payload: String,
}

pub struct ChangeEventDispatcher {
    hub: Arc<ChannelHub>,
    queue: mpsc::UnboundedSender<QueuedEvent>,
}

impl ChangeEventDispatcher {
    /// Create the dispatcher and spawn its queue consumer
    ///
    /// Must be called from within a tokio runtime. The consumer stops once
    /// the dispatcher is dropped and the queue has drained.
    pub fn start(hub: Arc<ChannelHub>, pool: WorkerPool) -> Arc<Self> {
        let (queue, events) = mpsc::unbounded_channel();
        tokio::spawn(consume(events, Arc::clone(&hub), pool));
        Arc::new(Self { hub, queue })
    }

    pub fn hub(&self) -> &Arc<ChannelHub> {
        &self.hub
    }
}

impl ChangeNotifier for ChangeEventDispatcher {
    fn notify(&self, channel: &str, operation: OperationKind, entity: &dyn Snapshot) {
        if !self.hub.contains(channel) {
            tracing::error!(
                "[Notify] Dropping {} {} event for unknown channel '{}'",
                entity.entity_type(),
                operation,
                channel
            );
            return;
        }

        let payload = match ChangeEvent::from_snapshot(operation, entity).and_then(|event| event.to_json()) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!(
                    "[Notify] Failed to build {} {} event: {}",
                    entity.entity_type(),
                    operation,
                    e
                );
                return;
            }
        };

        let queued = QueuedEvent {
            channel: channel.to_string(),
            entity: entity.entity_type(),
            operation,
            payload,
        };
        if self.queue.send(queued).is_err() {
            tracing::warn!("[Notify] Dispatcher queue closed, dropping event for '{}'", channel);
        }
    }
}

async fn consume(mut events: mpsc::UnboundedReceiver<QueuedEvent>, hub: Arc<ChannelHub>, pool: WorkerPool) {
    while let Some(queued) = events.recv().await {
        let hub = Arc::clone(&hub);
        let label = format!("broadcast {} {} on {}", queued.entity, queued.operation, queued.channel);

        pool.spawn(label, async move {
            let scheduled = hub.broadcast(&queued.channel, &queued.payload)?;
            tracing::debug!(
                "[Notify] {} {} on '{}' fanned out to {} connections",
                queued.entity,
                queued.operation,
                queued.channel,
                scheduled
            );
            Ok::<(), RealtimeError>(())
        });
    }
    tracing::info!("[Notify] Dispatcher queue closed, consumer stopping");
}
