/**
 * Application State Management
 *
 * `AppState` is the central state container handed to the router. Handlers
 * either take the whole state or extract one part of it through the
 * `FromRef` implementations below.
 *
 * Business handlers only see the notifier as `Arc<dyn ChangeNotifier>`; the
 * hub is exposed separately for the WebSocket handler and channel stats.
 */

use axum::extract::FromRef;
use std::sync::Arc;

use crate::backend::catalog::CatalogStore;
use crate::backend::digest::BulkDigestJob;
use crate::backend::notify::ChangeNotifier;
use crate::backend::realtime::ChannelHub;
use crate::backend::worker::WorkerPool;

#[derive(Clone)]
pub struct AppState {
    /// Catalog persistence
    pub store: Arc<dyn CatalogStore>,
    /// Change notification sink for mutating handlers
    pub notifier: Arc<dyn ChangeNotifier>,
    /// Every configured channel
    pub hub: Arc<ChannelHub>,
    pub digest: Arc<BulkDigestJob>,
    /// Pool running the dispatcher's broadcast units
    pub dispatch_pool: WorkerPool,
}

impl FromRef<AppState> for Arc<ChannelHub> {
    fn from_ref(state: &AppState) -> Self {
        Arc::clone(&state.hub)
    }
}

impl FromRef<AppState> for Arc<BulkDigestJob> {
    fn from_ref(state: &AppState) -> Self {
        Arc::clone(&state.digest)
    }
}

impl FromRef<AppState> for Arc<dyn CatalogStore> {
    fn from_ref(state: &AppState) -> Self {
        Arc::clone(&state.store)
    }
}
