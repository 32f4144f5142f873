//! Roadmap configuration

use flowplan_roadmap::{SortSpec, DEFAULT_NOTICE_TTL};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::CoreError;

/// Log output format for the binary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Roadmap configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoadmapConfig {
    /// Lifetime of a validation notice, in seconds
    pub notice_ttl_secs: u64,
    /// Sort applied when the roadmap opens
    pub default_sort: SortSpec,
    /// JSON file backing the mutation logs
    pub store_path: Option<PathBuf>,
    /// Size limit for the stored log document
    pub quota_bytes: Option<usize>,
    pub log_format: LogFormat,
}

impl RoadmapConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a TOML document
    ///
    /// # Errors
    /// Returns [`CoreError::Config`] on malformed TOML or unknown values
    pub fn from_toml(source: &str) -> Result<Self, CoreError> {
        Ok(toml::from_str(source)?)
    }

    /// Read and parse a TOML file
    ///
    /// # Errors
    /// Returns [`CoreError::ConfigIo`] if the file cannot be read
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let source = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| CoreError::config_io(path, e))?;
        let config = Self::from_toml(&source)?;
        tracing::debug!(path = %path.display(), "loaded roadmap config");
        Ok(config)
    }

    #[inline]
    #[must_use]
    pub fn notice_ttl(&self) -> Duration {
        Duration::from_secs(self.notice_ttl_secs)
    }

    #[inline]
    #[must_use]
    pub fn with_notice_ttl_secs(mut self, secs: u64) -> Self {
        self.notice_ttl_secs = secs;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_default_sort(mut self, sort: SortSpec) -> Self {
        self.default_sort = sort;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.store_path = Some(path.into());
        self
    }

    #[inline]
    #[must_use]
    pub fn with_quota_bytes(mut self, quota: usize) -> Self {
        self.quota_bytes = Some(quota);
        self
    }

    #[inline]
    #[must_use]
    pub fn with_log_format(mut self, format: LogFormat) -> Self {
        self.log_format = format;
        self
    }
}

impl Default for RoadmapConfig {
    fn default() -> Self {
        Self {
            notice_ttl_secs: DEFAULT_NOTICE_TTL.as_secs(),
            default_sort: SortSpec::by_priority(),
            store_path: None,
            quota_bytes: None,
            log_format: LogFormat::Pretty,
        }
    }
}
