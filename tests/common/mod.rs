//! Common test utilities
//!
//! - `TestApp` - an assembled app over the in-memory store and a recording
//!   mailer
//! - `ChannelTransport` - a `Transport` that forwards payloads to a test
//! - `send` - one request through the router via `oneshot`

#![allow(dead_code)]

pub mod assertions;

pub use assertions::*;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use storefront::backend::catalog::MemoryCatalogStore;
use storefront::backend::digest::{MailError, Mailer};
use storefront::backend::realtime::{Transport, TransportError};
use storefront::backend::server::{assemble, App};
use storefront::shared::AppConfig;
use tokio::sync::mpsc;
use tower::ServiceExt;

/// A sent digest mail
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<SentMail>>,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<SentMail> {
        let mut sent = self.sent.lock().unwrap().clone();
        sent.sort_by(|a, b| a.to.cmp(&b.to));
        sent
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send_message(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError> {
        self.sent.lock().unwrap().push(SentMail {
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}

pub struct TestApp {
    pub app: App,
    pub store: Arc<MemoryCatalogStore>,
    pub mailer: Arc<RecordingMailer>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    pub fn with_config(config: AppConfig) -> Self {
        let store = Arc::new(MemoryCatalogStore::new());
        let mailer = Arc::new(RecordingMailer::default());
        let app = assemble(&config, store.clone(), mailer.clone());
        Self { app, store, mailer }
    }

    pub fn router(&self) -> &Router {
        &self.app.router
    }

    /// Wait for every queued broadcast and mail to finish
    pub async fn settle(&self) {
        tokio::time::sleep(Duration::from_millis(20)).await;
        self.app.state.dispatch_pool.wait_idle().await;
        self.app.state.hub.wait_idle().await;
        self.app.state.digest.wait_idle().await;
    }
}

/// Send one request and decode the JSON response body
///
/// Empty bodies decode to `Value::Null`.
pub async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

/// Transport that hands every payload to the test through a channel
pub struct ChannelTransport {
    tx: mpsc::UnboundedSender<String>,
    broken: AtomicBool,
}

impl ChannelTransport {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let transport = Arc::new(Self {
            tx,
            broken: AtomicBool::new(false),
        });
        (transport, rx)
    }

    /// Make every later send fail
    pub fn break_now(&self) {
        self.broken.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl Transport for ChannelTransport {
    async fn send(&self, payload: &str) -> Result<(), TransportError> {
        if self.broken.load(Ordering::SeqCst) {
            return Err(TransportError::Failed("peer went away".to_string()));
        }
        self.tx
            .send(payload.to_string())
            .map_err(|_| TransportError::Closed)
    }
}

/// Next payload as JSON, or `None` after one second
pub async fn next_json(rx: &mut mpsc::UnboundedReceiver<String>) -> Option<serde_json::Value> {
    let payload = tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .ok()??;
    Some(serde_json::from_str(&payload).unwrap())
}
