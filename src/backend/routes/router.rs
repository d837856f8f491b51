/**
 * Router Configuration
 *
 * Combines all route groups into one router, adds request tracing and a
 * JSON 404 fallback.
 *
 * # Route Groups
 *
 * 1. Realtime routes (WebSocket subscriptions)
 * 2. API routes (catalog CRUD)
 * 3. Operational routes (health, channel stats, manual digest)
 */

use axum::{http::StatusCode, Router};
use tower_http::trace::TraceLayer;

use crate::backend::error::BackendError;
use crate::backend::routes::api_routes::configure_api_routes;
use crate::backend::routes::ops_routes::configure_ops_routes;
use crate::backend::routes::realtime_routes::configure_realtime_routes;
use crate::backend::server::state::AppState;

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState) -> Router<()> {
    let router = Router::new();
    let router = configure_realtime_routes(router);
    let router = configure_api_routes(router);
    let router = configure_ops_routes(router);

    router
        .fallback(|| async { BackendError::handler(StatusCode::NOT_FOUND, "Not Found") })
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
