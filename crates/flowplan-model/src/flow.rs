//! The flow entity
//!
//! A [`Flow`] carries descriptive fields, optional planning metrics, its
//! section membership and priority, and attachments.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use ulid::Ulid;

use crate::agent::AgentId;
use crate::content::{ContentItem, Link};
use crate::entity::{Entity, EntityKind};
use crate::error::ModelError;
use crate::field::FlowField;
use crate::section::Section;

/// Unique flow identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlowId(String);

impl FlowId {
    /// Wrap an existing identifier
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh, time-sortable identifier
    #[inline]
    #[must_use]
    pub fn generate() -> Self {
        Self(Ulid::new().to_string())
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FlowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FlowId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for FlowId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Borrow<str> for FlowId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Implementation complexity on a 1-5 ordinal scale
///
/// Serialized as its ordinal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Complexity {
    Trivial = 1,
    Simple = 2,
    Moderate = 3,
    Complex = 4,
    Extreme = 5,
}

impl Complexity {
    /// Numeric ordinal (1-5)
    #[inline]
    #[must_use]
    pub fn ordinal(self) -> u8 {
        self as u8
    }

    #[inline]
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Complexity::Trivial => "Trivial",
            Complexity::Simple => "Simple",
            Complexity::Moderate => "Moderate",
            Complexity::Complex => "Complex",
            Complexity::Extreme => "Extreme",
        }
    }
}

impl TryFrom<u8> for Complexity {
    type Error = ModelError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Complexity::Trivial),
            2 => Ok(Complexity::Simple),
            3 => Ok(Complexity::Moderate),
            4 => Ok(Complexity::Complex),
            5 => Ok(Complexity::Extreme),
            other => Err(ModelError::InvalidComplexity(other)),
        }
    }
}

impl From<Complexity> for u8 {
    fn from(c: Complexity) -> Self {
        c.ordinal()
    }
}

/// A single automatable workflow tracked for prioritization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flow {
    pub id: FlowId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub agent_id: Option<AgentId>,

    /// Expected annual occurrences
    #[serde(default)]
    pub baseline_volume: Option<u64>,
    /// Percentage of occurrences handled (0-100)
    #[serde(default)]
    pub completion_rate: Option<f64>,
    #[serde(default)]
    pub value_per_occurrence: Option<f64>,
    #[serde(default)]
    pub cost_per_occurrence: Option<f64>,
    #[serde(default)]
    pub complexity: Option<Complexity>,

    pub status: Section,
    /// 1-based rank within the section; assigned by the section store
    #[serde(default)]
    pub priority: Option<u32>,

    #[serde(default)]
    pub content: Vec<ContentItem>,
    #[serde(default)]
    pub links: Vec<Link>,
}

impl Flow {
    /// Create a flow with only the identifying fields filled in
    #[must_use]
    pub fn new(id: impl Into<FlowId>, name: impl Into<String>, status: Section) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            category: None,
            role: None,
            agent_id: None,
            baseline_volume: None,
            completion_rate: None,
            value_per_occurrence: None,
            cost_per_occurrence: None,
            complexity: None,
            status,
            priority: None,
            content: Vec::new(),
            links: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    #[must_use]
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    #[must_use]
    pub fn with_agent(mut self, agent: impl Into<AgentId>) -> Self {
        self.agent_id = Some(agent.into());
        self
    }

    #[must_use]
    pub fn with_baseline_volume(mut self, volume: u64) -> Self {
        self.baseline_volume = Some(volume);
        self
    }

    #[must_use]
    pub fn with_completion_rate(mut self, rate: f64) -> Self {
        self.completion_rate = Some(rate);
        self
    }

    #[must_use]
    pub fn with_value_per_occurrence(mut self, value: f64) -> Self {
        self.value_per_occurrence = Some(value);
        self
    }

    #[must_use]
    pub fn with_cost_per_occurrence(mut self, cost: f64) -> Self {
        self.cost_per_occurrence = Some(cost);
        self
    }

    #[must_use]
    pub fn with_complexity(mut self, complexity: Complexity) -> Self {
        self.complexity = Some(complexity);
        self
    }

    #[must_use]
    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = Some(priority);
        self
    }

    #[must_use]
    pub fn with_content(mut self, item: ContentItem) -> Self {
        self.content.push(item);
        self
    }

    #[must_use]
    pub fn with_link(mut self, link: Link) -> Self {
        self.links.push(link);
        self
    }

    /// Whether a field holds a usable value
    ///
    /// Zero, empty strings and empty lists count as unset.
    #[must_use]
    pub fn is_set(&self, field: FlowField) -> bool {
        fn nonzero(v: Option<f64>) -> bool {
            v.is_some_and(|v| v != 0.0 && !v.is_nan())
        }
        fn nonblank(v: Option<&String>) -> bool {
            v.is_some_and(|s| !s.trim().is_empty())
        }

        match field {
            FlowField::Name => !self.name.trim().is_empty(),
            FlowField::Description => !self.description.trim().is_empty(),
            FlowField::Category => nonblank(self.category.as_ref()),
            FlowField::Role => nonblank(self.role.as_ref()),
            FlowField::AgentId => self.agent_id.is_some(),
            FlowField::BaselineVolume => self.baseline_volume.is_some_and(|v| v != 0),
            FlowField::CompletionRate => nonzero(self.completion_rate),
            FlowField::ValuePerOccurrence => nonzero(self.value_per_occurrence),
            FlowField::CostPerOccurrence => nonzero(self.cost_per_occurrence),
            FlowField::Complexity => self.complexity.is_some(),
            FlowField::Status => true,
            FlowField::Priority => self.priority.is_some_and(|p| p != 0),
            FlowField::Content => !self.content.is_empty(),
            FlowField::Links => !self.links.is_empty(),
        }
    }

    /// Drop every content item that is not a charter
    ///
    /// Returns the number of items removed.
    pub fn retain_charter_content(&mut self) -> usize {
        let before = self.content.len();
        self.content.retain(ContentItem::is_charter);
        before - self.content.len()
    }
}

impl Entity for Flow {
    const KIND: EntityKind = EntityKind::Flows;

    fn entity_id(&self) -> &str {
        self.id.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ContentVariant;
    use pretty_assertions::assert_eq;

    #[test]
    fn complexity_serializes_as_ordinal() {
        let json = serde_json::to_string(&Complexity::Complex).unwrap();
        assert_eq!(json, "4");

        let parsed: Complexity = serde_json::from_str("2").unwrap();
        assert_eq!(parsed, Complexity::Simple);

        assert!(serde_json::from_str::<Complexity>("6").is_err());
    }

    #[test]
    fn zero_counts_as_unset() {
        let flow = Flow::new("f1", "Refund", Section::Backlog)
            .with_baseline_volume(0)
            .with_completion_rate(80.0)
            .with_cost_per_occurrence(0.0);

        assert!(!flow.is_set(FlowField::BaselineVolume));
        assert!(flow.is_set(FlowField::CompletionRate));
        assert!(!flow.is_set(FlowField::CostPerOccurrence));
        assert!(!flow.is_set(FlowField::ValuePerOccurrence));
    }

    #[test]
    fn retain_charter_content_prunes_other_variants() {
        let mut flow = Flow::new("f1", "Refund", Section::Planning)
            .with_content(ContentItem::new("Charter", ContentVariant::Charter))
            .with_content(ContentItem::new("Notes", ContentVariant::Reference))
            .with_content(ContentItem::new("Scope", ContentVariant::Scope));

        assert_eq!(flow.retain_charter_content(), 2);
        assert_eq!(flow.content.len(), 1);
        assert!(flow.content[0].is_charter());
    }

    #[test]
    fn deserializes_minimal_payload() {
        let flow: Flow =
            serde_json::from_str(r#"{"id":"f9","name":"Lookup","status":"planning"}"#).unwrap();
        assert_eq!(flow.id, FlowId::from("f9"));
        assert_eq!(flow.status, Section::Planning);
        assert!(flow.priority.is_none());
        assert!(flow.content.is_empty());
    }
}
