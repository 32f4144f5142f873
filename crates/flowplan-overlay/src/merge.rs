//! Folding a mutation log over a baseline
//!
//! Records are applied per entity in timestamp order; ties keep append order.
//!
//! - `update` overlays its fields onto the running value
//! - `delete` removes the entity from the result
//! - `create` sets the running value to its payload, introducing the entity
//!   when the baseline has no such id
//!
//! Records that cannot apply (an `update` for an unknown or deleted id, or a
//! payload that breaks the entity schema) are skipped; they stay in the log.
//! The result depends only on the baseline and the log, so merging is
//! repeatable and `merge(merge(b, log), log) == merge(b, log)`.

use flowplan_model::Entity;
use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::record::{MutationRecord, Operation};

type Object = Map<String, Value>;

fn id_of(object: &Object) -> Option<&str> {
    object.get("id").and_then(Value::as_str)
}

fn fold<F>(baseline: Vec<Object>, log: &[MutationRecord], accept: F) -> Vec<Object>
where
    F: Fn(&Object) -> bool,
{
    let mut slots: Vec<Option<Object>> = Vec::with_capacity(baseline.len());
    let mut positions: HashMap<String, usize> = HashMap::with_capacity(baseline.len());

    for object in baseline {
        let Some(id) = id_of(&object).map(str::to_string) else {
            tracing::warn!("baseline entity without id skipped");
            continue;
        };
        if positions.contains_key(&id) {
            tracing::warn!(%id, "duplicate baseline id skipped");
            continue;
        }
        positions.insert(id, slots.len());
        slots.push(Some(object));
    }

    let mut ordered: Vec<&MutationRecord> = log.iter().collect();
    ordered.sort_by_key(|r| r.timestamp);

    for record in ordered {
        match record.operation {
            Operation::Create => {
                let mut object = record.data.clone();
                object.insert("id".to_string(), Value::String(record.id.clone()));
                if !accept(&object) {
                    tracing::warn!(id = %record.id, "create record does not match schema, skipped");
                    continue;
                }
                match positions.get(&record.id) {
                    Some(&slot) => slots[slot] = Some(object),
                    None => {
                        positions.insert(record.id.clone(), slots.len());
                        slots.push(Some(object));
                    }
                }
            }
            Operation::Update => {
                let current = positions
                    .get(&record.id)
                    .and_then(|&slot| slots[slot].as_ref().map(|obj| (slot, obj)));
                let Some((slot, current)) = current else {
                    tracing::warn!(id = %record.id, "update for unknown entity, skipped");
                    continue;
                };
                let mut next = current.clone();
                for (key, value) in &record.data {
                    if key != "id" {
                        next.insert(key.clone(), value.clone());
                    }
                }
                if accept(&next) {
                    slots[slot] = Some(next);
                } else {
                    tracing::warn!(id = %record.id, "update does not match schema, skipped");
                }
            }
            Operation::Delete => {
                if let Some(&slot) = positions.get(&record.id) {
                    slots[slot] = None;
                }
            }
        }
    }

    slots.into_iter().flatten().collect()
}

/// Merge a log over untyped baseline objects
///
/// Any JSON object carrying a string `id` is accepted.
#[must_use]
pub fn merge_values(baseline: &[Object], log: &[MutationRecord]) -> Vec<Object> {
    fold(baseline.to_vec(), log, |object| id_of(object).is_some())
}

/// Merge a log over typed baseline entities
///
/// Records whose result would not deserialize as `T` are skipped.
#[must_use]
pub fn merge<T: Entity>(baseline: &[T], log: &[MutationRecord]) -> Vec<T> {
    let objects: Vec<Object> = baseline
        .iter()
        .filter_map(|entity| match entity.to_object() {
            Ok(object) => Some(object),
            Err(err) => {
                tracing::warn!(id = entity.entity_id(), %err, "baseline entity not representable");
                None
            }
        })
        .collect();

    let accept = |object: &Object| serde_json::from_value::<T>(Value::Object(object.clone())).is_ok();

    let merged: Vec<T> = fold(objects, log, accept)
        .into_iter()
        .filter_map(|object| serde_json::from_value(Value::Object(object)).ok())
        .collect();

    tracing::debug!(kind = %T::KIND, baseline = baseline.len(), records = log.len(), merged = merged.len(), "merged log");
    merged
}
