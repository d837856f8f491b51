/**
 * Storefront Server Entry Point
 *
 * Loads `.env` and configuration, installs tracing, builds the app and
 * serves it until the process is stopped.
 */

use storefront::backend::server::init::create_app;
use storefront::shared::AppConfig;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file if present
    dotenv::dotenv().ok();

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    tracing::info!("[Startup] Server initialization started");

    let config = AppConfig::load()?;
    let port = config.server_port;
    let app = create_app(config).await?;

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("[Startup] Listening on {}", addr);

    axum::serve(listener, app.router).await?;

    Ok(())
}
