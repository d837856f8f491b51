//! Backend Module
//!
//! This module contains all server-side code for the storefront: the Axum
//! HTTP server, catalog persistence and the change notification core.
//!
//! # Architecture
//!
//! - **`server`** - Server initialization, application state, configuration
//! - **`routes`** - HTTP route configuration and router assembly
//! - **`catalog`** - Catalog store and REST handlers
//! - **`notify`** - `ChangeNotifier` and the queue-backed dispatcher
//! - **`realtime`** - Channels, connection registries, WebSocket subscriptions
//! - **`digest`** - Scheduled digest mails of new products
//! - **`worker`** - Bounded pool for isolated units of work
//! - **`error`** - Backend-specific error types
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── mod.rs     - Module exports and documentation
//! ├── main.rs    - Server binary
//! ├── server/    - Server initialization and state
//! ├── routes/    - Route configuration
//! ├── catalog/   - Persistence and handlers
//! ├── notify/    - Change notification
//! ├── realtime/  - Event broadcasting
//! ├── digest/    - Digest job and mailers
//! ├── worker/    - Worker pool
//! └── error/     - Error types
//! ```
//!
//! # Notification Flow
//!
//! ```text
//! handler ── store write ── notify() ──> queue ──> consumer ──> pool unit
//!                                                                  │
//!                                         hub.broadcast(channel) <─┘
//!                                                  │
//!                                  one pool unit per open connection
//! ```
//!
//! The handler's response is fixed once the store write returns; nothing
//! downstream of `notify` can change it.

/// Server initialization and application state
pub mod server;

/// Route configuration
pub mod routes;

/// Catalog persistence and REST handlers
pub mod catalog;

/// Change notification
pub mod notify;

/// Channels and WebSocket subscriptions
pub mod realtime;

/// Digest job
pub mod digest;

/// Worker pool
pub mod worker;

/// Backend error types
pub mod error;

pub use error::BackendError;
pub use server::{create_app, App, AppState};
