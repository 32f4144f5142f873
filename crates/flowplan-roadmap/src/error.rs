//! Error types for the roadmap
//!
//! Provides error handling for:
//! - Promotion gating (missing planning metrics)
//! - Section store lookups and transitions
//! - Invariant checks

use flowplan_model::{FlowField, FlowId, Section};

fn join_labels(fields: &[FlowField]) -> String {
    fields
        .iter()
        .map(|f| f.label())
        .collect::<Vec<_>>()
        .join(", ")
}

/// A flow was refused entry to a gated section
///
/// Recoverable: the flow stays where it was.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot move {flow_id} to {section}: missing {}", join_labels(.missing))]
pub struct ValidationFailure {
    /// Flow that was refused
    pub flow_id: FlowId,
    /// Destination section
    pub section: Section,
    /// Required fields that are unset, in catalogue order
    pub missing: Vec<FlowField>,
}

impl ValidationFailure {
    /// Labels of the missing fields, e.g. `["Baseline Volume", "Deflection Rate"]`
    #[must_use]
    pub fn missing_labels(&self) -> Vec<&'static str> {
        self.missing.iter().map(|f| f.label()).collect()
    }
}

/// Section store errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoadmapError {
    /// No flow with this id on the roadmap
    #[error("unknown flow: {0}")]
    UnknownFlow(FlowId),

    /// Flow is not in the section the caller expected
    #[error("flow {flow_id} is in {actual}, expected {expected}")]
    NotInSection {
        flow_id: FlowId,
        expected: Section,
        actual: Section,
    },

    /// Flow is already in the destination
    #[error("flow {flow_id} is already in {section}")]
    AlreadyInSection { flow_id: FlowId, section: Section },

    /// Id already present on the roadmap
    #[error("duplicate flow: {0}")]
    DuplicateFlow(FlowId),

    /// New flows start in Backlog or Planning
    #[error("new flows cannot be created in {0}")]
    InvalidEntrySection(Section),

    /// Entry to a gated section refused
    #[error(transparent)]
    Rejected(#[from] ValidationFailure),
}

impl RoadmapError {
    /// Validation failure, if this is one
    #[inline]
    #[must_use]
    pub fn as_validation(&self) -> Option<&ValidationFailure> {
        match self {
            Self::Rejected(failure) => Some(failure),
            _ => None,
        }
    }
}

/// Broken section store invariant
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvariantViolation {
    /// Priorities are not exactly 1..N in order
    #[error("{section}: position {position} has priority {found:?}, expected {expected}")]
    PriorityGap {
        section: Section,
        position: usize,
        expected: u32,
        found: Option<u32>,
    },

    /// Flow status disagrees with the collection holding it
    #[error("flow {flow_id} has status {status} but sits in {section}")]
    StatusMismatch {
        flow_id: FlowId,
        status: Section,
        section: Section,
    },

    /// Flow appears in more than one place
    #[error("flow {0} appears more than once")]
    Duplicate(FlowId),

    /// Index entry does not match the collections
    #[error("index out of sync for flow {0}")]
    IndexMismatch(FlowId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_failure_lists_labels() {
        let failure = ValidationFailure {
            flow_id: FlowId::from("f1"),
            section: Section::Ready,
            missing: vec![FlowField::BaselineVolume, FlowField::CompletionRate],
        };
        assert_eq!(
            failure.to_string(),
            "cannot move f1 to Ready to build: missing Baseline Volume, Deflection Rate"
        );
        assert_eq!(failure.missing_labels(), ["Baseline Volume", "Deflection Rate"]);
    }

    #[test]
    fn rejected_is_transparent() {
        let failure = ValidationFailure {
            flow_id: FlowId::from("f1"),
            section: Section::Ready,
            missing: vec![FlowField::CostPerOccurrence],
        };
        let err = RoadmapError::from(failure.clone());
        assert_eq!(err.to_string(), failure.to_string());
        assert_eq!(err.as_validation(), Some(&failure));
    }
}
