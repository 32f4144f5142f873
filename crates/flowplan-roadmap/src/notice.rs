//! Validation notices scoped to a destination section
//!
//! A rejected move raises one notice on the section it targeted. The notice,
//! and the errored border it implies, lasts for a fixed window (5s by
//! default) or until dismissed. A newer rejection replaces the older one.

use flowplan_model::{FlowField, FlowId, Section};
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use crate::error::ValidationFailure;

pub const DEFAULT_NOTICE_TTL: Duration = Duration::from_secs(5);

/// User-visible validation error on a section
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionNotice {
    pub section: Section,
    pub flow_id: FlowId,
    pub message: String,
    pub missing: Vec<&'static str>,
    #[serde(skip)]
    pub expires_at: Instant,
}

impl SectionNotice {
    #[inline]
    #[must_use]
    pub fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// Active notices, at most one per section
#[derive(Debug, Clone)]
pub struct NoticeBoard {
    ttl: Duration,
    notices: BTreeMap<Section, SectionNotice>,
}

impl NoticeBoard {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            notices: BTreeMap::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Raise a notice for a rejected move
    pub fn raise(&mut self, failure: &ValidationFailure, now: Instant) -> &SectionNotice {
        let missing: Vec<&'static str> = failure.missing.iter().map(|f: &FlowField| f.label()).collect();
        let notice = SectionNotice {
            section: failure.section,
            flow_id: failure.flow_id.clone(),
            message: format!("Missing required fields: {}", missing.join(", ")),
            missing,
            expires_at: now + self.ttl,
        };
        tracing::warn!(section = %failure.section, flow = %failure.flow_id, "{}", notice.message);

        self.notices.insert(failure.section, notice);
        &self.notices[&failure.section]
    }

    /// Dismiss the notice on `section`; returns whether one was live
    pub fn dismiss(&mut self, section: Section) -> bool {
        self.notices.remove(&section).is_some()
    }

    /// Drop expired notices
    pub fn prune(&mut self, now: Instant) {
        self.notices.retain(|_, n| n.is_live(now));
    }

    /// Live notices in section order
    pub fn active(&self, now: Instant) -> impl Iterator<Item = &SectionNotice> {
        self.notices.values().filter(move |n| n.is_live(now))
    }

    #[must_use]
    pub fn get(&self, section: Section, now: Instant) -> Option<&SectionNotice> {
        self.notices.get(&section).filter(|n| n.is_live(now))
    }

    /// Whether the section border should render as errored
    #[inline]
    #[must_use]
    pub fn is_errored(&self, section: Section, now: Instant) -> bool {
        self.get(section, now).is_some()
    }
}

impl Default for NoticeBoard {
    fn default() -> Self {
        Self::new(DEFAULT_NOTICE_TTL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure() -> ValidationFailure {
        ValidationFailure {
            flow_id: FlowId::from("f1"),
            section: Section::Ready,
            missing: vec![FlowField::CompletionRate],
        }
    }

    #[test]
    fn notice_expires_after_ttl() {
        let mut board = NoticeBoard::default();
        let now = Instant::now();
        board.raise(&failure(), now);

        assert!(board.is_errored(Section::Ready, now + Duration::from_millis(4_999)));
        assert!(!board.is_errored(Section::Ready, now + Duration::from_secs(5)));
        assert!(!board.is_errored(Section::Backlog, now));
    }

    #[test]
    fn dismiss_clears_immediately() {
        let mut board = NoticeBoard::default();
        let now = Instant::now();
        board.raise(&failure(), now);

        assert!(board.dismiss(Section::Ready));
        assert!(!board.is_errored(Section::Ready, now));
        assert!(!board.dismiss(Section::Ready));
    }

    #[test]
    fn message_names_missing_fields() {
        let mut board = NoticeBoard::default();
        let notice = board.raise(&failure(), Instant::now());
        assert_eq!(notice.missing, ["Deflection Rate"]);
        assert!(notice.message.contains("Deflection Rate"));
    }

    #[test]
    fn prune_drops_expired() {
        let mut board = NoticeBoard::new(Duration::from_secs(1));
        let now = Instant::now();
        board.raise(&failure(), now);
        board.prune(now + Duration::from_secs(2));
        assert_eq!(board.active(now).count(), 0);
    }
}
