//! Roadmap sections
//!
//! Every flow lives in exactly one section. The section doubles as the flow's
//! `status` label.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ModelError;

/// One of the three ordered roadmap containers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    /// Ready to build: fully specified flows
    Ready,
    /// Planning: flows being specified
    Planning,
    /// Backlog: everything else
    Backlog,
}

impl Section {
    /// All sections in render order
    pub const ALL: [Section; 3] = [Section::Ready, Section::Planning, Section::Backlog];

    /// Canonical status label stored on a flow in this section
    #[inline]
    #[must_use]
    pub fn status_label(self) -> &'static str {
        match self {
            Section::Ready => "ready",
            Section::Planning => "planning",
            Section::Backlog => "backlog",
        }
    }

    /// Human-readable heading
    #[inline]
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Section::Ready => "Ready to build",
            Section::Planning => "Planning",
            Section::Backlog => "Backlog",
        }
    }

    /// Whether entering this section requires complete planning metrics
    #[inline]
    #[must_use]
    pub fn is_gated(self) -> bool {
        matches!(self, Section::Ready)
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

impl FromStr for Section {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ready" | "ready to build" | "ready-to-build" => Ok(Section::Ready),
            "planning" => Ok(Section::Planning),
            "backlog" => Ok(Section::Backlog),
            other => Err(ModelError::invalid_value("status", format!("unknown section '{other}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_ready_is_gated() {
        assert!(Section::Ready.is_gated());
        assert!(!Section::Planning.is_gated());
        assert!(!Section::Backlog.is_gated());
    }

    #[test]
    fn parses_titles_and_labels() {
        assert_eq!("Ready to build".parse::<Section>().unwrap(), Section::Ready);
        assert_eq!("planning".parse::<Section>().unwrap(), Section::Planning);
        assert!("done".parse::<Section>().is_err());
    }

    #[test]
    fn serializes_as_status_label() {
        let json = serde_json::to_string(&Section::Backlog).unwrap();
        assert_eq!(json, format!("\"{}\"", Section::Backlog.status_label()));
    }
}
