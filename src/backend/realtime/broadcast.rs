/**
 * Channel Broadcasting
 *
 * A `BroadcastChannel` is one named topic with its own injected
 * `ConnectionRegistry`. It registers subscribers (sending each a one-time
 * welcome payload), removes them on close, and fans a payload out to every
 * open connection.
 *
 * # Fan-out
 *
 * `broadcast` snapshots the registry and spawns one isolated send per open
 * connection on the `WorkerPool`, then returns the number of sends
 * scheduled. A failed send is logged by the pool, closes the connection and
 * removes it from the registry; it never affects sibling sends or the
 * caller.
 */
use std::sync::Arc;

use crate::backend::realtime::connection::{Connection, Transport};
use crate::backend::realtime::error::RealtimeError;
use crate::backend::realtime::registry::ConnectionRegistry;
use crate::backend::worker::WorkerPool;
use crate::shared::WelcomeMessage;

pub struct BroadcastChannel {
    name: String,
    registry: Arc<ConnectionRegistry>,
    pool: WorkerPool,
}

impl BroadcastChannel {
    pub fn new(name: impl Into<String>, registry: Arc<ConnectionRegistry>, pool: WorkerPool) -> Self {
        Self {
            name: name.into(),
            registry,
            pool,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    pub fn connection_count(&self) -> usize {
        self.registry.len()
    }

    /// Wait until no send on this channel is queued or running
    pub async fn wait_idle(&self) {
        self.pool.wait_idle().await;
    }

    /// Attach a subscriber
    ///
    /// The welcome payload is sent before the connection is registered, so it
    /// is always the first thing the subscriber sees. If it cannot be
    /// delivered the connection is discarded.
    pub async fn subscribe(&self, transport: Arc<dyn Transport>) -> Result<Arc<Connection>, RealtimeError> {
        let connection = Arc::new(Connection::new(self.name.clone(), transport));
        let welcome = WelcomeMessage::new(&self.name, connection.id()).to_json()?;

        if let Err(source) = connection.send(&welcome).await {
            connection.close();
            return Err(RealtimeError::SendFailed {
                channel: self.name.clone(),
                connection_id: connection.id(),
                source,
            });
        }

        self.registry.add(Arc::clone(&connection));
        tracing::info!(
            "[Realtime] Connection {} subscribed to '{}' ({} active)",
            connection.id(),
            self.name,
            self.registry.len()
        );
        Ok(connection)
    }

    /// Detach a subscriber; returns whether it was registered
    pub fn unsubscribe(&self, connection: &Connection) -> bool {
        connection.close();
        let removed = self.registry.remove(&connection.id()).is_some();
        if removed {
            tracing::info!(
                "[Realtime] Connection {} unsubscribed from '{}' ({} active)",
                connection.id(),
                self.name,
                self.registry.len()
            );
        }
        removed
    }

    /// Fan a payload out to every open connection
    ///
    /// Returns the number of send attempts scheduled.
    pub fn broadcast(&self, payload: &str) -> usize {
        let snapshot = self.registry.snapshot();
        if snapshot.is_empty() {
            tracing::debug!("[Realtime] No subscribers on '{}', nothing to send", self.name);
            return 0;
        }

        let payload: Arc<str> = Arc::from(payload);
        let mut scheduled = 0;

        for connection in snapshot {
            if !connection.is_open() {
                continue;
            }
            scheduled += 1;

            let payload = Arc::clone(&payload);
            let registry = Arc::clone(&self.registry);
            let channel = self.name.clone();
            let label = format!("send {}/{}", channel, connection.id());

            self.pool.spawn(label, async move {
                match connection.send(&payload).await {
                    Ok(()) => Ok(()),
                    Err(source) => {
                        connection.close();
                        registry.remove(&connection.id());
                        Err(RealtimeError::SendFailed {
                            channel,
                            connection_id: connection.id(),
                            source,
                        })
                    }
                }
            });
        }

        tracing::debug!("[Realtime] Scheduled {} sends on '{}'", scheduled, self.name);
        scheduled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::realtime::test_support::RecordingTransport;
    use std::time::Duration;

    fn channel(pool: &WorkerPool) -> BroadcastChannel {
        BroadcastChannel::new("products", Arc::new(ConnectionRegistry::new()), pool.clone())
    }

    async fn subscribe(channel: &BroadcastChannel, transport: &Arc<RecordingTransport>) -> Arc<Connection> {
        let connection = channel.subscribe(transport.clone()).await.unwrap();
        let welcome = transport.next_payload().await.unwrap();
        assert!(welcome.contains("WELCOME"));
        connection
    }

    #[tokio::test]
    async fn test_subscribe_sends_welcome_first() {
        let pool = WorkerPool::new(4);
        let channel = channel(&pool);
        let transport = Arc::new(RecordingTransport::new());

        let connection = channel.subscribe(transport.clone()).await.unwrap();
        let welcome: serde_json::Value =
            serde_json::from_str(&transport.next_payload().await.unwrap()).unwrap();

        assert_eq!(welcome["channel"], "products");
        assert_eq!(welcome["connectionId"], connection.id().to_string());
        assert_eq!(channel.connection_count(), 1);
    }

    #[tokio::test]
    async fn test_failed_welcome_is_not_registered() {
        let pool = WorkerPool::new(4);
        let channel = channel(&pool);
        let transport = Arc::new(RecordingTransport::failing_after(0));

        let result = channel.subscribe(transport).await;
        assert!(matches!(result, Err(RealtimeError::SendFailed { .. })));
        assert_eq!(channel.connection_count(), 0);
    }

    #[tokio::test]
    async fn test_broadcast_to_zero_connections() {
        let pool = WorkerPool::new(4);
        let channel = channel(&pool);

        assert_eq!(channel.broadcast("{}"), 0);
        assert_eq!(pool.pending(), 0);
    }

    #[tokio::test]
    async fn test_broadcast_reaches_every_open_connection() {
        let pool = WorkerPool::new(4);
        let channel = channel(&pool);
        let mut transports = Vec::new();
        for _ in 0..5 {
            let transport = Arc::new(RecordingTransport::new());
            subscribe(&channel, &transport).await;
            transports.push(transport);
        }

        assert_eq!(channel.broadcast("update"), 5);
        pool.wait_idle().await;

        for transport in &transports {
            assert_eq!(transport.attempts(), 2);
            assert_eq!(transport.drain().await, vec!["update".to_string()]);
        }
    }

    #[tokio::test]
    async fn test_failing_connection_is_isolated_and_removed() {
        let pool = WorkerPool::new(4);
        let channel = channel(&pool);

        let healthy: Vec<_> = (0..3).map(|_| Arc::new(RecordingTransport::new())).collect();
        for transport in &healthy {
            subscribe(&channel, transport).await;
        }
        let broken = Arc::new(RecordingTransport::failing_after(1));
        subscribe(&channel, &broken).await;

        assert_eq!(channel.broadcast("first"), 4);
        pool.wait_idle().await;

        for transport in &healthy {
            assert_eq!(transport.drain().await, vec!["first".to_string()]);
        }
        assert_eq!(channel.connection_count(), 3);

        assert_eq!(channel.broadcast("second"), 3);
        pool.wait_idle().await;
        assert_eq!(broken.attempts(), 2);
    }

    #[tokio::test]
    async fn test_unsubscribe_stops_delivery() {
        let pool = WorkerPool::new(4);
        let channel = channel(&pool);
        let transport = Arc::new(RecordingTransport::new());
        let connection = subscribe(&channel, &transport).await;

        assert!(channel.unsubscribe(&connection));
        assert!(!channel.unsubscribe(&connection));
        assert_eq!(channel.broadcast("late"), 0);
        pool.wait_idle().await;
        assert!(transport.drain().await.is_empty());
    }

    #[tokio::test]
    async fn test_subscriber_joining_mid_broadcast_gets_later_events() {
        let pool = WorkerPool::new(4);
        let channel = channel(&pool);
        let slow = Arc::new(RecordingTransport::slow(Duration::from_millis(100)));
        channel.subscribe(slow.clone()).await.unwrap();
        slow.next_payload().await.unwrap();

        assert_eq!(channel.broadcast("in-flight"), 1);

        let late = Arc::new(RecordingTransport::new());
        subscribe(&channel, &late).await;

        pool.wait_idle().await;
        assert!(late.drain().await.is_empty());

        assert_eq!(channel.broadcast("next"), 2);
        pool.wait_idle().await;
        assert_eq!(late.drain().await, vec!["next".to_string()]);
        assert_eq!(slow.drain().await, vec!["in-flight".to_string(), "next".to_string()]);
    }
}
