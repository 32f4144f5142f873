//! Flowplan Metrics
//!
//! Pure functions deriving financial and complexity metrics from a flow's raw
//! planning attributes. Identical inputs always produce identical outputs.
//!
//! # Formulas
//!
//! - usage = round(baseline volume × completion rate / 100)
//! - utilization cost = round(cost per run × usage)
//! - value = usage × (value per run − cost per run), may be negative
//! - ROI = round(value per run / cost per run × 100) %
//! - opportunity score: bounded 60-100 composite of net value and complexity
//!
//! # Example
//!
//! ```rust,ignore
//! use flowplan_metrics::FlowMetrics;
//!
//! let metrics = FlowMetrics::compute(&flow);
//! println!("{} runs/yr, ROI {}", metrics.usage, metrics.roi);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod calculator;
mod score;

pub use calculator::{roi, usage, utilization_cost, value, FlowMetrics, Roi};
pub use score::{format_score, opportunity_score, SCORE_MAX, SCORE_MIN};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
