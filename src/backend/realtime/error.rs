use thiserror::Error;

use crate::backend::realtime::connection::{ConnectionId, TransportError};
use crate::shared::SharedError;

/// Errors raised inside the realtime layer
///
/// None of these ever reach a business caller; they end at a log statement
/// or, for subscription attempts, at the transport handler.
#[derive(Debug, Error)]
pub enum RealtimeError {
    /// The channel name was not configured at startup
    #[error("Unknown channel: {0}")]
    UnknownChannel(String),

    /// A send to one connection failed
    #[error("Send to connection {connection_id} on channel '{channel}' failed: {source}")]
    SendFailed {
        channel: String,
        connection_id: ConnectionId,
        #[source]
        source: TransportError,
    },

    /// A payload could not be serialized
    #[error(transparent)]
    Shared(#[from] SharedError),
}
