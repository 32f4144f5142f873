//! Error types for the roadmap facade
//!
//! Provides error handling for:
//! - Field edits and drafts
//! - Section transitions
//! - Durable store access
//! - Configuration loading

use flowplan_model::{AgentId, FlowId, ModelError};
use flowplan_overlay::{OverlayError, PersistError};
use flowplan_roadmap::RoadmapError;
use std::path::PathBuf;

/// Main roadmap error type
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Invalid field name or value
    #[error("invalid edit: {0}")]
    Model(#[from] ModelError),

    /// Record could not be built or decoded
    #[error("mutation log error: {0}")]
    Overlay(#[from] OverlayError),

    /// Section store refused the operation
    #[error(transparent)]
    Roadmap(#[from] RoadmapError),

    /// Durable store read or write failed
    #[error("persistence failed: {0}")]
    Persist(#[from] PersistError),

    /// No agent with this id
    #[error("unknown agent: {0}")]
    UnknownAgent(AgentId),

    /// Agent id already in use
    #[error("duplicate agent: {0}")]
    DuplicateAgent(AgentId),

    /// Save requested for a flow with no pending edits
    #[error("no draft for flow {0}")]
    NoDraft(FlowId),

    /// Configuration could not be read
    #[error("failed to read config {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration could not be parsed
    #[error("configuration error: {0}")]
    Config(#[from] toml::de::Error),
}

impl CoreError {
    /// Create config IO error for path
    pub fn config_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ConfigIo {
            path: path.into(),
            source,
        }
    }

    /// Whether the session can carry on after this error
    ///
    /// Everything a user action can trigger is recoverable; only a broken
    /// configuration or corrupt stored log is not.
    #[inline]
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            Self::ConfigIo { .. } | Self::Config(_) | Self::Persist(PersistError::Corrupt(_))
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowplan_model::{FlowField, Section};
    use flowplan_roadmap::ValidationFailure;

    #[test]
    fn validation_failures_are_recoverable() {
        let err = CoreError::from(RoadmapError::from(ValidationFailure {
            flow_id: FlowId::from("f1"),
            section: Section::Ready,
            missing: vec![FlowField::CompletionRate],
        }));
        assert!(err.is_recoverable());
        assert!(err.to_string().contains("Deflection Rate"));
    }

    #[test]
    fn persistence_classification() {
        let quota = CoreError::from(PersistError::QuotaExceeded { needed: 10, quota: 5 });
        assert!(quota.is_recoverable());

        let corrupt = CoreError::from(PersistError::Corrupt("eof".into()));
        assert!(!corrupt.is_recoverable());
    }
}
