//! Unsaved field edits
//!
//! Each flow has at most one draft: a set of field changes type-checked
//! against the flow schema as they arrive. Saving turns the draft into a
//! single update record; discarding drops it.

use flowplan_model::{overlay, Flow, FlowField, FlowId, ModelError};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Pending edits keyed by flow
#[derive(Debug, Clone, Default)]
pub struct Drafts {
    pending: HashMap<FlowId, Map<String, Value>>,
}

fn check_range(field: FlowField, value: &Value) -> Result<(), ModelError> {
    let Some(n) = value.as_f64() else {
        return Ok(());
    };
    match field {
        FlowField::CompletionRate if !(0.0..=100.0).contains(&n) => Err(ModelError::invalid_value(
            field.key(),
            "must be a percentage between 0 and 100",
        )),
        FlowField::BaselineVolume | FlowField::ValuePerOccurrence | FlowField::CostPerOccurrence
            if n < 0.0 =>
        {
            Err(ModelError::invalid_value(field.key(), "must not be negative"))
        }
        _ => Ok(()),
    }
}

impl Drafts {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage one field change
    ///
    /// The change is checked by overlaying the whole draft onto `base`;
    /// nothing is staged if that fails.
    ///
    /// # Errors
    /// - [`ModelError::ReadOnlyField`] for `status` and `priority`
    /// - [`ModelError::InvalidFieldValue`] if the value does not fit the field
    pub fn edit(&mut self, base: &Flow, field: FlowField, value: Value) -> Result<(), ModelError> {
        if field.is_section_owned() {
            return Err(ModelError::ReadOnlyField(field.key().to_string()));
        }
        check_range(field, &value)?;

        let mut changes = self.pending.get(&base.id).cloned().unwrap_or_default();
        changes.insert(field.key().to_string(), value);
        overlay(base, &changes).map_err(|e| ModelError::invalid_value(field.key(), e))?;

        tracing::trace!(flow = %base.id, field = field.key(), "staged edit");
        self.pending.insert(base.id.clone(), changes);
        Ok(())
    }

    /// The flow as it would look once saved
    ///
    /// # Errors
    /// Returns error if the staged changes no longer fit `base`
    pub fn preview(&self, base: &Flow) -> Result<Flow, ModelError> {
        match self.pending.get(&base.id) {
            Some(changes) => overlay(base, changes),
            None => Ok(base.clone()),
        }
    }

    #[inline]
    #[must_use]
    pub fn changes(&self, id: &FlowId) -> Option<&Map<String, Value>> {
        self.pending.get(id)
    }

    #[inline]
    #[must_use]
    pub fn has_draft(&self, id: &FlowId) -> bool {
        self.pending.contains_key(id)
    }

    /// Remove and return the staged changes
    pub fn take(&mut self, id: &FlowId) -> Option<Map<String, Value>> {
        self.pending.remove(id)
    }

    /// Put changes back after a refused save
    pub(crate) fn restore(&mut self, id: FlowId, changes: Map<String, Value>) {
        self.pending.insert(id, changes);
    }

    /// Drop the draft; returns whether there was one
    pub fn discard(&mut self, id: &FlowId) -> bool {
        self.pending.remove(id).is_some()
    }

    /// Keep only drafts for which `keep` holds
    pub fn retain(&mut self, mut keep: impl FnMut(&FlowId) -> bool) {
        self.pending.retain(|id, _| keep(id));
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
