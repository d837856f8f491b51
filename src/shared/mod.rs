//! Shared Module
//!
//! This module contains types and data structures that are shared between the
//! server and its clients. Everything here is serializable and carries no
//! server runtime dependencies.
//!
//! # Overview
//!
//! - `event` - Change events and the subscription welcome payload
//! - `catalog` - Products, categories, orders and users
//! - `config` - Application configuration
//! - `error` - Shared error types

/// Change event wire types
pub mod event;

/// Shared error types
pub mod error;

/// Catalog entities
pub mod catalog;

/// Application configuration
pub mod config;

/// Re-export commonly used types for convenience
pub use event::{ChangeEvent, Entity, OperationKind, Snapshot, WelcomeMessage};
pub use error::SharedError;
pub use catalog::{Category, Order, OrderStatus, Product, Recipient, User};
pub use config::{AppConfig, AppConfigBuilder, ConfigError, SmtpConfig};
