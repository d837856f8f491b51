//! Route Configuration Module
//!
//! This module configures all HTTP routes for the backend server.
//! Routes are organized by functionality into focused submodules.
//!
//! # Module Structure
//!
//! ```text
//! routes/
//! ├── mod.rs             - Module exports and documentation
//! ├── router.rs          - Main router creation
//! ├── realtime_routes.rs - WebSocket channel subscriptions
//! ├── api_routes.rs      - Catalog REST endpoints
//! └── ops_routes.rs      - Health, channel stats, manual digest run
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use storefront::backend::server::init::create_app;
//! use storefront::shared::AppConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let app = create_app(AppConfig::default()).await?;
//! let router = app.router;
//! # Ok(())
//! # }
//! ```

/// Main router creation
pub mod router;

/// WebSocket subscription routes
pub mod realtime_routes;

/// Catalog API routes
pub mod api_routes;

/// Operational routes
pub mod ops_routes;

pub use router::create_router;
