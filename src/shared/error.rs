//! Shared Error Types
//!
//! Error types for failures that can occur while building shared values:
//! snapshotting an entity into a change event, or validating a request
//! before it reaches the catalog store.
//!
//! # Error Categories
//!
//! - `SerializationError` - JSON serialization failures
//! - `ValidationError` - Field validation failures
//!
//! # Usage
//!
//! ```rust
//! use storefront::shared::error::SharedError;
//!
//! let error = SharedError::validation("name", "Product name cannot be blank");
//! ```
use thiserror::Error;

/// Shared error types
#[derive(Debug, Error, Clone)]
pub enum SharedError {
    /// JSON serialization error
    #[error("Serialization error: {message}")]
    SerializationError {
        /// Human-readable error message
        message: String,
    },

    /// Data validation error
    #[error("Validation error in field '{field}': {message}")]
    ValidationError {
        /// The field that failed validation
        field: String,
        /// Human-readable error message
        message: String,
    },
}

impl SharedError {
    /// Create a new serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::SerializationError {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for SharedError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(format!("JSON error: {}", err))
    }
}
