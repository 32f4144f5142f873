//! Error types for the mutation overlay
//!
//! Provides error handling for:
//! - Building and decoding log records
//! - Durable store reads and writes

use flowplan_model::ModelError;
use std::path::PathBuf;

/// Errors building or decoding log content
#[derive(Debug, thiserror::Error)]
pub enum OverlayError {
    /// Entity could not be turned into a record payload
    #[error("invalid entity: {0}")]
    Model(#[from] ModelError),

    /// Malformed log document
    #[error("malformed log document: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors from the durable store
///
/// None of these touch in-memory state; callers keep their optimistic
/// changes and surface a warning.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    /// IO failure on the backing file
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Document larger than the store accepts
    #[error("storage quota exceeded: {needed} bytes needed, {quota} allowed")]
    QuotaExceeded { needed: usize, quota: usize },

    /// Store cannot be reached
    #[error("durable store unavailable: {0}")]
    Unavailable(String),

    /// Stored document could not be decoded
    #[error("stored log is corrupt: {0}")]
    Corrupt(String),
}

impl PersistError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether a later write may succeed without user action
    #[inline]
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Io { .. } | Self::Unavailable(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quota_message_names_sizes() {
        let err = PersistError::QuotaExceeded {
            needed: 2048,
            quota: 1024,
        };
        assert!(err.to_string().contains("2048"));
        assert!(!err.is_transient());
        assert!(PersistError::Unavailable("offline".into()).is_transient());
    }
}
