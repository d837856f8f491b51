//! Backend Error Module
//!
//! This module defines the error type returned by HTTP handlers and its
//! conversion into HTTP responses.
//!
//! # Module Structure
//!
//! ```text
//! error/
//! ├── mod.rs        - Module exports and documentation
//! ├── types.rs      - BackendError and status mapping
//! └── conversion.rs - IntoResponse implementation
//! ```
//!
//! Errors of the notification path (`RealtimeError`, `MailError`) never
//! reach this type from a mutation; they end in the log. Only the WebSocket
//! upgrade handler surfaces `RealtimeError`, for unknown channels.

/// Error type definitions
pub mod types;

/// Error conversion implementations
pub mod conversion;

pub use types::BackendError;
