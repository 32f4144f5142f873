//! Mutation records
//!
//! A record is immutable once appended. Its `data` is a partial payload:
//! the full object for `create`, changed fields for `update`, empty for
//! `delete`.

use chrono::{DateTime, Utc};
use flowplan_model::Entity;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::error::OverlayError;

/// Record operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Create,
    Update,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
        };
        f.write_str(s)
    }
}

/// One logged mutation against an entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutationRecord {
    /// Target entity id
    pub id: String,
    pub operation: Operation,
    #[serde(default)]
    pub data: Map<String, Value>,
    pub timestamp: DateTime<Utc>,
}

impl MutationRecord {
    /// Record introducing `entity`
    ///
    /// # Errors
    /// Returns error if the entity does not serialize to an object
    pub fn create<T: Entity>(entity: &T) -> Result<Self, OverlayError> {
        Ok(Self {
            id: entity.entity_id().to_string(),
            operation: Operation::Create,
            data: entity.to_object()?,
            timestamp: Utc::now(),
        })
    }

    /// Record overlaying `changes` onto entity `id`
    #[must_use]
    pub fn update(id: impl Into<String>, changes: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            operation: Operation::Update,
            data: changes,
            timestamp: Utc::now(),
        }
    }

    /// Record removing entity `id`
    #[must_use]
    pub fn delete(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            operation: Operation::Delete,
            data: Map::new(),
            timestamp: Utc::now(),
        }
    }

    /// Override the timestamp
    #[inline]
    #[must_use]
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}
