//! Change Notification Module
//!
//! Business handlers report entity mutations through the [`ChangeNotifier`]
//! trait. The production implementation, [`ChangeEventDispatcher`], builds
//! the change event on the caller's task, queues it, and lets a background
//! consumer hand it to the channel hub on the worker pool.
//!
//! Notification is a side effect of a mutation, never a condition of it:
//! `notify` returns `()` and nothing that happens after it can reach the
//! handler that called it.
//!
//! ```text
//! notify/
//! ├── mod.rs        - ChangeNotifier trait and NoopNotifier
//! └── dispatcher.rs - Queue-backed dispatcher
//! ```

/// Queue-backed change event dispatcher
pub mod dispatcher;

pub use dispatcher::ChangeEventDispatcher;

use crate::shared::{OperationKind, Snapshot};

/// Fire-and-forget emission of entity changes
///
/// The entity is snapshotted before `notify` returns; delivery happens later
/// on another task, if at all.
pub trait ChangeNotifier: Send + Sync {
    fn notify(&self, channel: &str, operation: OperationKind, entity: &dyn Snapshot);
}

/// Notifier that drops every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

impl ChangeNotifier for NoopNotifier {
    fn notify(&self, _channel: &str, _operation: OperationKind, _entity: &dyn Snapshot) {}
}
