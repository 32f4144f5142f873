//! Export format for the mutation logs
//!
//! A single JSON document with one array per entity type:
//!
//! ```json
//! { "flows": [ {"id": "f1", "operation": "update", "data": {...}, "timestamp": "..."} ],
//!   "agents": [] }
//! ```

use flowplan_model::EntityKind;
use serde::{Deserialize, Serialize};

use crate::error::OverlayError;
use crate::record::MutationRecord;

/// Every mutation log, keyed by entity type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogDocument {
    #[serde(default)]
    pub flows: Vec<MutationRecord>,
    #[serde(default)]
    pub agents: Vec<MutationRecord>,
}

impl LogDocument {
    #[inline]
    #[must_use]
    pub fn records(&self, kind: EntityKind) -> &[MutationRecord] {
        match kind {
            EntityKind::Flows => &self.flows,
            EntityKind::Agents => &self.agents,
        }
    }

    /// Total records across all logs
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.flows.len() + self.agents.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pretty-printed JSON
    ///
    /// # Errors
    /// Returns error if a record payload cannot be serialized
    pub fn to_json(&self) -> Result<String, OverlayError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// # Errors
    /// Returns error if `json` is not a valid log document
    pub fn from_json(json: &str) -> Result<Self, OverlayError> {
        Ok(serde_json::from_str(json)?)
    }
}
