/**
 * Operational Routes
 *
 * - `GET /health` - Liveness check
 * - `GET /api/channels` - Configured channels with live connection counts
 * - `POST /api/digest/run` - Run the digest now and return its report
 */

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;

use crate::backend::digest::{BulkDigestJob, DigestRunReport};
use crate::backend::realtime::{ChannelHub, ChannelStats};
use crate::backend::server::state::AppState;

pub fn configure_ops_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/health", get(health))
        .route("/api/channels", get(list_channels))
        .route("/api/digest/run", post(run_digest))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn list_channels(State(hub): State<Arc<ChannelHub>>) -> Json<Vec<ChannelStats>> {
    Json(hub.stats())
}

/// Runs with the wall clock; waits for any scheduled run in progress
async fn run_digest(State(digest): State<Arc<BulkDigestJob>>) -> Json<DigestRunReport> {
    tracing::info!("[Digest] Manual run requested");
    Json(digest.run().await)
}
