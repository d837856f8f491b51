//! Worker Module
//!
//! Bounded execution of fire-and-forget units of work. Broadcast sends and
//! digest mails are each spawned as their own task on the shared
//! [`WorkerPool`]; the pool caps how many run at once without ever making the
//! spawning caller wait.
//!
//! ```text
//! worker/
//! ├── mod.rs   - Module exports and documentation
//! └── pool.rs  - Semaphore-bounded task pool
//! ```

/// Semaphore-bounded task pool
pub mod pool;

pub use pool::WorkerPool;
