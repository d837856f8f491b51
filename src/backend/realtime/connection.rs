/**
 * Subscriber Connections
 *
 * A `Connection` is the opaque handle to one live subscriber on one channel.
 * It owns an id, an open/closed flag and the `Transport` used to push text
 * payloads. The transport is whatever full-duplex link the subscriber
 * attached through; in production that is a WebSocket writer task.
 */
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier for a connection
pub type ConnectionId = Uuid;

/// Transport-level send failure
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("connection closed")]
    Closed,

    #[error("send failed: {0}")]
    Failed(String),
}

/// Outbound half of an established subscriber link
#[async_trait]
pub trait Transport: Send + Sync {
    /// Push one text payload to the subscriber
    async fn send(&self, payload: &str) -> Result<(), TransportError>;
}

/// Handle to one live subscriber
pub struct Connection {
    id: ConnectionId,
    channel: String,
    open: AtomicBool,
    transport: Arc<dyn Transport>,
}

impl Connection {
    pub fn new(channel: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        Self {
            id: Uuid::new_v4(),
            channel: channel.into(),
            open: AtomicBool::new(true),
            transport,
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    /// Mark closed; returns whether it was open before
    pub fn close(&self) -> bool {
        self.open.swap(false, Ordering::AcqRel)
    }

    /// Send a payload; closed connections fail without touching the transport
    pub async fn send(&self, payload: &str) -> Result<(), TransportError> {
        if !self.is_open() {
            return Err(TransportError::Closed);
        }
        self.transport.send(payload).await
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("channel", &self.channel)
            .field("open", &self.is_open())
            .finish()
    }
}
