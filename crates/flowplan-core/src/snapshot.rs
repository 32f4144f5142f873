//! Immutable render snapshots

use chrono::{DateTime, Utc};
use flowplan_metrics::{format_score, FlowMetrics};
use flowplan_model::{Flow, Section};
use flowplan_roadmap::{DropIndicator, SectionNotice, SortSpec};
use serde::Serialize;

/// A durable write that failed; in-memory state was kept
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistenceWarning {
    pub message: String,
    /// A later write may succeed without user action
    pub transient: bool,
    pub at: DateTime<Utc>,
}

/// One table row
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowRow {
    pub flow: Flow,
    pub metrics: FlowMetrics,
    /// Opportunity score as displayed, `"N/A"` when not computable
    pub score_label: String,
    pub has_draft: bool,
}

impl FlowRow {
    #[must_use]
    pub fn new(flow: Flow, has_draft: bool) -> Self {
        let metrics = FlowMetrics::compute(&flow);
        let score_label = format_score(metrics.opportunity_score);
        Self {
            flow,
            metrics,
            score_label,
            has_draft,
        }
    }
}

/// One section table in display order
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionView {
    pub section: Section,
    pub title: &'static str,
    /// Border renders as errored while a notice is live
    pub errored: bool,
    pub rows: Vec<FlowRow>,
}

impl SectionView {
    #[must_use]
    pub fn ids(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.flow.id.as_str()).collect()
    }
}

/// Everything needed to render the roadmap at one instant
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoadmapSnapshot {
    /// Log revision the snapshot was built from
    pub revision: u64,
    pub sort: SortSpec,
    pub drag_enabled: bool,
    pub indicator: Option<DropIndicator>,
    pub sections: Vec<SectionView>,
    pub notices: Vec<SectionNotice>,
    pub warnings: Vec<PersistenceWarning>,
}

impl RoadmapSnapshot {
    #[must_use]
    pub fn section(&self, section: Section) -> Option<&SectionView> {
        self.sections.iter().find(|v| v.section == section)
    }
}
