/**
 * Change Event System
 *
 * This module defines the payloads pushed to channel subscribers. A
 * `ChangeEvent` describes one create, update or delete of a tracked entity;
 * a `WelcomeMessage` is sent once to every new subscriber.
 *
 * # Wire Format
 *
 * ```json
 * {
 *   "entity": "product",
 *   "type": "CREATE",
 *   "data": { "id": "...", "name": "Desk Lamp" },
 *   "createdAt": "2024-05-01T09:00:00Z"
 * }
 * ```
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::SharedError;

/// Kind of mutation a change event describes
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum OperationKind {
    /// Entity was created
    Create,
    /// Entity was updated
    Update,
    /// Entity was deleted
    Delete,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A catalog entity that can appear in change events
pub trait Entity: Serialize {
    /// Type tag carried in the `entity` field
    const ENTITY_TYPE: &'static str;

    /// Fields visible to channel subscribers; all of them unless overridden
    fn public_fields(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

/// Object-safe view of an entity for notifiers
pub trait Snapshot {
    fn entity_type(&self) -> &'static str;

    /// JSON snapshot of the entity's public fields
    fn snapshot(&self) -> Result<serde_json::Value, SharedError>;
}

impl<T: Entity> Snapshot for T {
    fn entity_type(&self) -> &'static str {
        T::ENTITY_TYPE
    }

    fn snapshot(&self) -> Result<serde_json::Value, SharedError> {
        Ok(self.public_fields()?)
    }
}

/// One entity mutation, built once and broadcast once
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEvent {
    /// Entity type tag (e.g. "product")
    pub entity: String,
    /// Mutation kind
    #[serde(rename = "type")]
    pub operation: OperationKind,
    /// Snapshot of the entity's public fields
    pub data: serde_json::Value,
    /// When the event was built
    pub created_at: DateTime<Utc>,
}

impl ChangeEvent {
    /// Create a change event from an already-built snapshot
    pub fn new(entity: impl Into<String>, operation: OperationKind, data: serde_json::Value) -> Self {
        Self {
            entity: entity.into(),
            operation,
            data,
            created_at: Utc::now(),
        }
    }

    /// Build a change event from any snapshot source
    pub fn from_snapshot(operation: OperationKind, entity: &dyn Snapshot) -> Result<Self, SharedError> {
        Ok(Self::new(entity.entity_type(), operation, entity.snapshot()?))
    }

    /// Serialize to the JSON text sent to subscribers
    pub fn to_json(&self) -> Result<String, SharedError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// One-time payload sent to a connection when it subscribes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WelcomeMessage {
    #[serde(rename = "type")]
    pub kind: String,
    pub channel: String,
    pub connection_id: Uuid,
    pub message: String,
}

impl WelcomeMessage {
    pub fn new(channel: &str, connection_id: Uuid) -> Self {
        Self {
            kind: "WELCOME".to_string(),
            channel: channel.to_string(),
            connection_id,
            message: format!("Subscribed to {} updates", channel),
        }
    }

    pub fn to_json(&self) -> Result<String, SharedError> {
        Ok(serde_json::to_string(self)?)
    }
}
