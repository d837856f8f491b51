/**
 * WebSocket Subscription Handler
 *
 * Implements `GET /ws/{channel}`. After the upgrade the socket is split:
 * a writer task drains an mpsc queue into the socket, and the
 * `WsTransport` registered with the channel pushes onto that queue. The
 * reader half only watches for close; inbound frames are ignored.
 *
 * # Connection Management
 *
 * - Unknown channels are rejected with `404` before upgrading
 * - Close frames, read errors and EOF all unsubscribe the connection
 * - Once the writer task stops, sends fail and the broadcaster drops the
 *   connection on its next attempt
 */
use async_trait::async_trait;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    http::StatusCode,
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::backend::error::BackendError;
use crate::backend::realtime::connection::{Transport, TransportError};
use crate::backend::realtime::hub::ChannelHub;

/// Transport feeding a WebSocket writer task
pub struct WsTransport {
    outbound: mpsc::UnboundedSender<String>,
}

impl WsTransport {
    pub fn new(outbound: mpsc::UnboundedSender<String>) -> Self {
        Self { outbound }
    }
}

#[async_trait]
impl Transport for WsTransport {
    async fn send(&self, payload: &str) -> Result<(), TransportError> {
        self.outbound
            .send(payload.to_string())
            .map_err(|_| TransportError::Closed)
    }
}

/// Handle channel subscription (GET /ws/{channel})
///
/// # Errors
///
/// * `404 Not Found` - If the channel was not configured
pub async fn handle_channel_subscription(
    ws: WebSocketUpgrade,
    Path(channel): Path<String>,
    State(hub): State<Arc<ChannelHub>>,
) -> Result<Response, BackendError> {
    if !hub.contains(&channel) {
        tracing::warn!("[Realtime] Subscription request for unknown channel '{}'", channel);
        return Err(BackendError::handler(
            StatusCode::NOT_FOUND,
            format!("Unknown channel '{}'", channel),
        ));
    }

    tracing::info!("[Realtime] Upgrading subscription to '{}'", channel);
    Ok(ws.on_upgrade(move |socket| serve_connection(socket, hub, channel)))
}

async fn serve_connection(socket: WebSocket, hub: Arc<ChannelHub>, channel: String) {
    let (mut sink, mut stream) = socket.split();
    let (outbound, mut queue) = mpsc::unbounded_channel::<String>();

    let writer = tokio::spawn(async move {
        while let Some(payload) = queue.recv().await {
            if sink.send(Message::Text(payload.into())).await.is_err() {
                break;
            }
        }
        let _ = sink.close().await;
    });

    let connection = match hub.subscribe(&channel, Arc::new(WsTransport::new(outbound))).await {
        Ok(connection) => connection,
        Err(e) => {
            tracing::warn!("[Realtime] Subscription to '{}' failed: {}", channel, e);
            writer.abort();
            return;
        }
    };

    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                tracing::debug!("[Realtime] Read error on {}: {}", connection.id(), e);
                break;
            }
        }
    }

    if let Err(e) = hub.unsubscribe(&channel, &connection) {
        tracing::warn!("[Realtime] Unsubscribe from '{}' failed: {}", channel, e);
    }
    writer.abort();
}
