//! Usage, value and ROI

use flowplan_model::Flow;
use serde::{Serialize, Serializer};
use std::fmt;

use crate::score::opportunity_score;

/// Projected annual occurrences the flow will handle
///
/// Zero when volume or completion rate is missing.
#[must_use]
pub fn usage(flow: &Flow) -> u64 {
    match (flow.baseline_volume, flow.completion_rate) {
        (Some(volume), Some(rate)) => {
            let projected = (volume as f64 * rate / 100.0).round();
            if projected.is_finite() && projected > 0.0 {
                projected as u64
            } else {
                0
            }
        }
        _ => 0,
    }
}

/// Annual spend on runs: round(cost per run × usage)
#[must_use]
pub fn utilization_cost(flow: &Flow) -> f64 {
    let cost = flow.cost_per_occurrence.unwrap_or(0.0);
    (cost * usage(flow) as f64).round()
}

/// Net annual value: usage × (value per run − cost per run)
///
/// Negative when a run costs more than it returns; zero when either
/// per-run figure is missing.
#[must_use]
pub fn value(flow: &Flow) -> f64 {
    match (flow.value_per_occurrence, flow.cost_per_occurrence) {
        (Some(v), Some(c)) => usage(flow) as f64 * (v - c),
        _ => 0.0,
    }
}

/// Return on investment as a whole percentage
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Roi(i64);

impl Roi {
    #[inline]
    #[must_use]
    pub fn percent(self) -> i64 {
        self.0
    }
}

impl fmt::Display for Roi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

impl Serialize for Roi {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// round(value per run / cost per run × 100), or 0% without a cost
#[must_use]
pub fn roi(flow: &Flow) -> Roi {
    match (flow.value_per_occurrence, flow.cost_per_occurrence) {
        (Some(v), Some(c)) if c != 0.0 => {
            let pct = (v / c * 100.0).round();
            if pct.is_finite() {
                Roi(pct as i64)
            } else {
                Roi(0)
            }
        }
        _ => Roi(0),
    }
}

/// All derived metrics for one flow
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowMetrics {
    pub usage: u64,
    pub utilization_cost: f64,
    pub value: f64,
    pub roi: Roi,
    /// `None` renders as "N/A"
    pub opportunity_score: Option<u8>,
}

impl FlowMetrics {
    #[must_use]
    pub fn compute(flow: &Flow) -> Self {
        Self {
            usage: usage(flow),
            utilization_cost: utilization_cost(flow),
            value: value(flow),
            roi: roi(flow),
            opportunity_score: opportunity_score(flow),
        }
    }
}
