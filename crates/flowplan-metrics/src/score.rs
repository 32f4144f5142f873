//! Opportunity score
//!
//! Composite 60-100 heuristic. Starts at 60 and adds:
//! - net profit per run, halved, capped at 30
//! - complexity bonus: max(5, complexity × 7.5)
//! - value tier: +15 at ≥100, +10 at ≥50, +5 at ≥25 per run
//! - +5 when value per run > 50 and complexity ≥ Moderate
//!
//! A flow missing value, cost or complexity (zero counts as missing) has no
//! score. That holds in every section and every view.

use flowplan_model::{Complexity, Flow, FlowField};

pub const SCORE_MIN: u8 = 60;
pub const SCORE_MAX: u8 = 100;

const NET_CAP: f64 = 30.0;
const COMPLEXITY_FLOOR: f64 = 5.0;
const COMPLEXITY_WEIGHT: f64 = 7.5;
const HIGH_VALUE_BONUS: f64 = 5.0;

fn value_tier_bonus(value_per_run: f64) -> f64 {
    if value_per_run >= 100.0 {
        15.0
    } else if value_per_run >= 50.0 {
        10.0
    } else if value_per_run >= 25.0 {
        5.0
    } else {
        0.0
    }
}

fn raw_score(value_per_run: f64, cost_per_run: f64, complexity: Complexity) -> f64 {
    let net = ((value_per_run - cost_per_run).max(0.0) / 2.0).min(NET_CAP);
    let complexity_bonus = (f64::from(complexity.ordinal()) * COMPLEXITY_WEIGHT).max(COMPLEXITY_FLOOR);
    let high_value = if value_per_run > 50.0 && complexity >= Complexity::Moderate {
        HIGH_VALUE_BONUS
    } else {
        0.0
    };

    f64::from(SCORE_MIN) + net + complexity_bonus + value_tier_bonus(value_per_run) + high_value
}

/// Opportunity score in `[60, 100]`, or `None` when inputs are missing
#[must_use]
pub fn opportunity_score(flow: &Flow) -> Option<u8> {
    if !flow.is_set(FlowField::ValuePerOccurrence) || !flow.is_set(FlowField::CostPerOccurrence) {
        return None;
    }
    let (value, cost, complexity) = (
        flow.value_per_occurrence?,
        flow.cost_per_occurrence?,
        flow.complexity?,
    );

    let score = raw_score(value, cost, complexity)
        .round()
        .clamp(f64::from(SCORE_MIN), f64::from(SCORE_MAX));
    Some(score as u8)
}

/// Render a score for tables and charts
#[must_use]
pub fn format_score(score: Option<u8>) -> String {
    score.map_or_else(|| "N/A".to_string(), |s| s.to_string())
}
