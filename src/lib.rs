//! Storefront - Main Library
//!
//! Storefront is an e-commerce backend (products, categories, orders, users)
//! built with Rust, whose core is a best-effort change-notification fan-out:
//! every mutation of a tracked entity is pushed to the WebSocket subscribers
//! of its channel, and a scheduled digest mails newly added products to every
//! user with an address.
//!
//! # Module Structure
//!
//! - **`shared`** - Platform-agnostic types
//!   - Change events and welcome payloads
//!   - Catalog entities (products, categories, orders, users)
//!   - Application configuration and shared error types
//!
//! - **`backend`** - Server-side code
//!   - Axum HTTP server, REST handlers and WebSocket subscriptions
//!   - Per-channel connection registries and broadcasting
//!   - Change event dispatcher and the bulk digest job
//!   - Catalog persistence (PostgreSQL or in-memory)
//!
//! # Usage
//!
//! ```rust,no_run
//! use storefront::backend::server::init::create_app;
//! use storefront::shared::AppConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::load()?;
//! let app = create_app(config).await?;
//! // Serve `app.router` with axum
//! # Ok(())
//! # }
//! ```
//!
//! # Delivery Guarantees
//!
//! Notifications and digest mails are fire-and-forget. Subscribers may miss an
//! event and recipients may miss a digest; neither is ever surfaced to the
//! request that caused it.
//!
//! # Thread Safety
//!
//! - Connection registries are `DashMap`s keyed by connection id
//! - Every send runs as its own task on a bounded `WorkerPool`
//! - The digest watermark lives behind a `tokio::sync::Mutex` owned by the job

/// Shared types and data structures
pub mod shared;

/// Backend server-side code
pub mod backend;
