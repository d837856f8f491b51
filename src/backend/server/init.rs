/**
 * Server Initialization
 *
 * Builds every long-lived component from `AppConfig` and wires them into
 * the router.
 *
 * # Initialization Order
 *
 * 1. Catalog store (PostgreSQL if reachable, in-memory otherwise)
 * 2. Channel hub with every configured channel, one worker pool each
 * 3. Change event dispatcher on top of the hub, with its own pool
 * 4. Digest job with its own pool, and its schedule
 * 5. Router
 *
 * The hub is complete before the dispatcher exists, so channel lookups
 * never race initialization.
 */

use axum::Router;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::backend::catalog::handlers::{CATEGORIES_CHANNEL, ORDERS_CHANNEL, PRODUCTS_CHANNEL, USERS_CHANNEL};
use crate::backend::catalog::{CatalogStore, MemoryCatalogStore, PgCatalogStore};
use crate::backend::digest::{BulkDigestJob, Mailer};
use crate::backend::notify::ChangeEventDispatcher;
use crate::backend::realtime::ChannelHub;
use crate::backend::routes::router::create_router;
use crate::backend::server::config::{load_database, load_mailer};
use crate::backend::server::state::AppState;
use crate::backend::worker::WorkerPool;
use crate::shared::{AppConfig, ConfigError};

/// A configured application
pub struct App {
    pub router: Router<()>,
    pub state: AppState,
    /// Background task driving digest runs
    pub digest_schedule: JoinHandle<()>,
}

/// Create and configure the application
///
/// Must be called from within a tokio runtime.
///
/// # Errors
///
/// Returns the validation error if `config` is inconsistent. Unavailable
/// external services are not errors; see `server::config`.
pub async fn create_app(config: AppConfig) -> Result<App, ConfigError> {
    config.validate()?;
    tracing::info!("Initializing storefront backend");

    let mailer = load_mailer(&config);
    let app = match load_database(config.database_url.as_deref()).await {
        Some(db) => assemble(&config, Arc::new(PgCatalogStore::new(db)), mailer),
        None => assemble(&config, Arc::new(MemoryCatalogStore::new()), mailer),
    };

    tracing::info!(
        "Router configured with channels [{}]",
        app.state.hub.channel_names().join(", ")
    );
    Ok(app)
}

/// Wire an application around an existing store and mailer
///
/// Must be called from within a tokio runtime.
pub fn assemble<S>(config: &AppConfig, store: Arc<S>, mailer: Arc<dyn Mailer>) -> App
where
    S: CatalogStore + 'static,
{
    let hub = Arc::new(ChannelHub::new(config.channels.iter().cloned(), config.worker_pool_size));

    for channel in [PRODUCTS_CHANNEL, CATEGORIES_CHANNEL, ORDERS_CHANNEL, USERS_CHANNEL] {
        if !hub.contains(channel) {
            tracing::warn!(
                "[Realtime] Channel '{}' is not configured; its changes will not be broadcast",
                channel
            );
        }
    }

    let dispatch_pool = WorkerPool::new(config.worker_pool_size);
    let notifier = ChangeEventDispatcher::start(Arc::clone(&hub), dispatch_pool.clone());
    let digest = Arc::new(BulkDigestJob::new(
        store.clone(),
        mailer,
        WorkerPool::new(config.worker_pool_size),
        Utc::now(),
    ));
    let digest_schedule = Arc::clone(&digest).spawn_schedule(Duration::from_secs(config.digest_interval_secs));
    tracing::info!("[Digest] Scheduled every {}s", config.digest_interval_secs);

    let state = AppState {
        store,
        notifier,
        hub,
        digest,
        dispatch_pool,
    };

    App {
        router: create_router(state.clone()),
        state,
        digest_schedule,
    }
}
