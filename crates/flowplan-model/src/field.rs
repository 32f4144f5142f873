//! Field catalogue for flows
//!
//! Maps the editable fields of a [`Flow`](crate::Flow) to their JSON keys and
//! user-facing labels.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ModelError;

/// A named field of a flow
///
/// Serializes as its JSON key, so `"completionRate"` names
/// [`FlowField::CompletionRate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FlowField {
    Name,
    Description,
    Category,
    Role,
    AgentId,
    BaselineVolume,
    CompletionRate,
    ValuePerOccurrence,
    CostPerOccurrence,
    Complexity,
    Status,
    Priority,
    Content,
    Links,
}

impl FlowField {
    pub const ALL: [FlowField; 14] = [
        FlowField::Name,
        FlowField::Description,
        FlowField::Category,
        FlowField::Role,
        FlowField::AgentId,
        FlowField::BaselineVolume,
        FlowField::CompletionRate,
        FlowField::ValuePerOccurrence,
        FlowField::CostPerOccurrence,
        FlowField::Complexity,
        FlowField::Status,
        FlowField::Priority,
        FlowField::Content,
        FlowField::Links,
    ];

    /// JSON key used in entity payloads and mutation records
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            FlowField::Name => "name",
            FlowField::Description => "description",
            FlowField::Category => "category",
            FlowField::Role => "role",
            FlowField::AgentId => "agentId",
            FlowField::BaselineVolume => "baselineVolume",
            FlowField::CompletionRate => "completionRate",
            FlowField::ValuePerOccurrence => "valuePerOccurrence",
            FlowField::CostPerOccurrence => "costPerOccurrence",
            FlowField::Complexity => "complexity",
            FlowField::Status => "status",
            FlowField::Priority => "priority",
            FlowField::Content => "content",
            FlowField::Links => "links",
        }
    }

    /// Label shown to users, e.g. in validation messages
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            FlowField::Name => "Name",
            FlowField::Description => "Description",
            FlowField::Category => "Category",
            FlowField::Role => "Role",
            FlowField::AgentId => "Agent",
            FlowField::BaselineVolume => "Baseline Volume",
            FlowField::CompletionRate => "Deflection Rate",
            FlowField::ValuePerOccurrence => "Value per Run",
            FlowField::CostPerOccurrence => "Price per Run",
            FlowField::Complexity => "Complexity",
            FlowField::Status => "Status",
            FlowField::Priority => "Priority",
            FlowField::Content => "Content",
            FlowField::Links => "Links",
        }
    }

    /// Fields only the section store may write
    #[inline]
    #[must_use]
    pub fn is_section_owned(self) -> bool {
        matches!(self, FlowField::Status | FlowField::Priority)
    }
}

impl fmt::Display for FlowField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for FlowField {
    type Err = ModelError;

    /// Accepts either the JSON key or the label
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        FlowField::ALL
            .into_iter()
            .find(|f| f.key() == s || f.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| ModelError::UnknownField(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_keys_and_labels() {
        assert_eq!(
            "completionRate".parse::<FlowField>().unwrap(),
            FlowField::CompletionRate
        );
        assert_eq!(
            "price per run".parse::<FlowField>().unwrap(),
            FlowField::CostPerOccurrence
        );
        assert!(matches!(
            "velocity".parse::<FlowField>(),
            Err(ModelError::UnknownField(_))
        ));
    }

    #[test]
    fn keys_match_flow_serialization() {
        let flow = crate::Flow::new("f1", "x", crate::Section::Backlog);
        let value = serde_json::to_value(&flow).unwrap();
        let object = value.as_object().unwrap();
        for field in FlowField::ALL {
            assert!(object.contains_key(field.key()), "missing {}", field.key());
        }
    }
}
