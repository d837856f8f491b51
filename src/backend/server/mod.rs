//! Server Module
//!
//! This module builds the running application from configuration.
//!
//! # Architecture
//!
//! - **`state`** - Application state structure and `FromRef` implementations
//! - **`config`** - Database and mailer loading
//! - **`init`** - Component wiring and app creation
//!
//! # Module Structure
//!
//! ```text
//! server/
//! ├── mod.rs    - Module exports and documentation
//! ├── state.rs  - AppState and FromRef implementations
//! ├── config.rs - Optional services (PostgreSQL, SMTP)
//! └── init.rs   - Server initialization and app creation
//! ```
//!
//! # Initialization Flow
//!
//! 1. **Validation**: `AppConfig::validate`
//! 2. **Services**: mailer, then database with migrations
//! 3. **Realtime**: channel hub (one worker pool per channel), change event
//!    dispatcher with its own pool
//! 4. **Digest**: job with watermark at startup time, scheduled on an interval
//! 5. **Router**: all routes plus request tracing

/// Application state management
pub mod state;

/// Optional service loading
pub mod config;

/// Server initialization
pub mod init;

pub use init::{assemble, create_app, App};
pub use state::AppState;
