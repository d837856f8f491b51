//! Digest Module
//!
//! Periodically mails every user with an address a summary of the products
//! added since the previous run.
//!
//! # Module Structure
//!
//! ```text
//! digest/
//! ├── mod.rs     - Module exports and documentation
//! ├── job.rs     - BulkDigestJob and its per-run state machine
//! ├── payload.rs - Subject and body rendering
//! └── mailer.rs  - Mailer trait, SMTP and log mailers
//! ```
//!
//! # Delivery
//!
//! Every recipient send is its own unit on the job's worker pool. A failed
//! send is logged and never retried; the watermark advances regardless.

pub mod job;
pub mod mailer;
pub mod payload;

pub use job::{BulkDigestJob, DigestOutcome, DigestRunReport};
pub use mailer::{LogMailer, MailError, Mailer, SmtpMailer};
pub use payload::DigestPayload;
