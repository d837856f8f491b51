/**
 * Realtime Route Configuration
 *
 * - `GET /ws/{channel}` - WebSocket subscription to one channel
 *
 * The channel segment must name a channel from the configuration; anything
 * else is rejected with `404` before the upgrade.
 */

use axum::{routing::get, Router};

use crate::backend::realtime::handle_channel_subscription;
use crate::backend::server::state::AppState;

pub fn configure_realtime_routes(router: Router<AppState>) -> Router<AppState> {
    router.route("/ws/{channel}", get(handle_channel_subscription))
}
