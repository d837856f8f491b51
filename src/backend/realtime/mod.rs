//! Real-time Update Module
//!
//! This module fans change events out to WebSocket subscribers. Each named
//! channel ("products", "orders", ...) owns its own connection registry, so a
//! slow or failing channel never touches another.
//!
//! # Architecture
//!
//! - **`connection`** - Subscriber handle and the `Transport` it sends through
//! - **`registry`** - Concurrent per-channel set of live connections
//! - **`broadcast`** - One channel: subscribe, unsubscribe, broadcast
//! - **`hub`** - All channels, built eagerly from configuration
//! - **`subscription`** - Axum WebSocket handler (`GET /ws/{channel}`)
//! - **`error`** - Realtime error types
//!
//! # Module Structure
//!
//! ```text
//! realtime/
//! ├── mod.rs          - Module exports and documentation
//! ├── connection.rs   - Connection handle and Transport trait
//! ├── registry.rs     - ConnectionRegistry
//! ├── broadcast.rs    - BroadcastChannel
//! ├── hub.rs          - ChannelHub
//! ├── subscription.rs - WebSocket subscription handler
//! └── error.rs        - RealtimeError
//! ```
//!
//! # Broadcasting
//!
//! A broadcast takes a snapshot of the registry and schedules one isolated
//! send per open connection on the shared `WorkerPool`. Connections added
//! after the snapshot miss that broadcast; connections removed after it are
//! simply skipped or fail quietly. A failed send closes the connection and
//! drops it from its registry.

/// Connection handle and transport abstraction
pub mod connection;

/// Per-channel connection registry
pub mod registry;

/// Single-channel broadcasting
pub mod broadcast;

/// Channel lookup by name
pub mod hub;

/// WebSocket subscription handler
pub mod subscription;

/// Realtime error types
pub mod error;

pub use broadcast::BroadcastChannel;
pub use connection::{Connection, ConnectionId, Transport, TransportError};
pub use error::RealtimeError;
pub use hub::{ChannelHub, ChannelStats};
pub use registry::ConnectionRegistry;
pub use subscription::handle_channel_subscription;
