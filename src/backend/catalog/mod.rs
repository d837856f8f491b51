//! Catalog Module
//!
//! Products, categories, orders and users: their persistence and the REST
//! handlers that mutate them. Handlers report every successful mutation to
//! the `ChangeNotifier` held in the application state.
//!
//! # Module Structure
//!
//! ```text
//! catalog/
//! ├── mod.rs      - Module exports and documentation
//! ├── store.rs    - CatalogStore / DigestSource traits, in-memory store
//! ├── db.rs       - PostgreSQL store
//! └── handlers.rs - REST handlers
//! ```

/// Store traits and the in-memory implementation
pub mod store;

/// PostgreSQL implementation
pub mod db;

/// REST handlers
pub mod handlers;

pub use db::PgCatalogStore;
pub use store::{CatalogStore, DigestSource, MemoryCatalogStore, StoreError};
