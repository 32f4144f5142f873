//! Entity trait shared by flows and agents
//!
//! The mutation overlay works on JSON objects; [`Entity`] ties a typed value to
//! its log and gives it a stable string id.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::error::ModelError;

/// Entity types with independent mutation logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Flows,
    Agents,
}

impl EntityKind {
    pub const ALL: [EntityKind; 2] = [EntityKind::Flows, EntityKind::Agents];

    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Flows => "flows",
            EntityKind::Agents => "agents",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A record type that can be folded through the mutation overlay
pub trait Entity: Serialize + DeserializeOwned + Clone + fmt::Debug {
    /// Log this entity type is recorded in
    const KIND: EntityKind;

    /// Stable identifier used to match log records
    fn entity_id(&self) -> &str;

    /// JSON object form of the entity
    ///
    /// # Errors
    /// Returns error if the entity does not serialize to an object
    fn to_object(&self) -> Result<Map<String, Value>, ModelError> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            _ => Err(ModelError::MissingId),
        }
    }
}

/// Apply a shallow field overlay to an entity
///
/// Each key in `changes` replaces the field of the same name; a `null` clears
/// an optional field. The `id` key is ignored so an overlay can never re-key
/// an entity.
///
/// # Errors
/// Returns [`ModelError::Serialization`] if the patched object no longer
/// matches the entity schema.
pub fn overlay<T: Entity>(base: &T, changes: &Map<String, Value>) -> Result<T, ModelError> {
    let mut object = base.to_object()?;
    for (key, value) in changes {
        if key == "id" {
            continue;
        }
        object.insert(key.clone(), value.clone());
    }
    Ok(serde_json::from_value(Value::Object(object))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Flow, Section};
    use serde_json::json;

    fn changes(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn overlay_replaces_and_clears_fields() {
        let flow = Flow::new("f1", "Refund", Section::Backlog).with_category("billing");

        let patched = overlay(
            &flow,
            &changes(json!({"name": "Refund v2", "category": null, "completionRate": 55.0})),
        )
        .unwrap();

        assert_eq!(patched.name, "Refund v2");
        assert_eq!(patched.category, None);
        assert_eq!(patched.completion_rate, Some(55.0));
    }

    #[test]
    fn overlay_never_rekeys() {
        let flow = Flow::new("f1", "Refund", Section::Backlog);
        let patched = overlay(&flow, &changes(json!({"id": "other"}))).unwrap();
        assert_eq!(patched.entity_id(), "f1");
    }

    #[test]
    fn overlay_rejects_schema_violations() {
        let flow = Flow::new("f1", "Refund", Section::Backlog);
        let result = overlay(&flow, &changes(json!({"complexity": 9})));
        assert!(matches!(result, Err(ModelError::Serialization(_))));
    }
}
