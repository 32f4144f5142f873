//! Plain-text rendering

use flowplan_core::{RoadmapSnapshot, SectionView};
use flowplan_metrics::{format_score, FlowMetrics};
use flowplan_model::Flow;
use std::fmt::Write;

fn money(value: f64) -> String {
    let rounded = value.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let digits = (rounded.abs() as u64).to_string();

    let mut grouped = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{sign}${grouped}")
}

fn section_table(out: &mut String, view: &SectionView) {
    let marker = if view.errored { " [!]" } else { "" };
    let _ = writeln!(out, "{} ({}){marker}", view.title, view.rows.len());
    if view.rows.is_empty() {
        let _ = writeln!(out, "  (empty)");
        return;
    }
    let _ = writeln!(
        out,
        "  {:>3}  {:<24} {:>12} {:>16} {:>7} {:>5}",
        "#", "id", "usage", "value", "roi", "score"
    );
    for row in &view.rows {
        let _ = writeln!(
            out,
            "  {:>3}  {:<24} {:>12} {:>16} {:>7} {:>5}",
            row.flow.priority.map_or_else(|| "-".to_string(), |p| p.to_string()),
            row.flow.id.as_str(),
            row.metrics.usage,
            money(row.metrics.value),
            row.metrics.roi.to_string(),
            row.score_label,
        );
    }
}

/// All three sections as tables
pub(crate) fn sections(snapshot: &RoadmapSnapshot) -> String {
    let mut out = String::new();
    for (i, view) in snapshot.sections.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        section_table(&mut out, view);
    }
    for notice in &snapshot.notices {
        let _ = writeln!(out, "\n{}: {}", notice.section.title(), notice.message);
    }
    out
}

/// Metric breakdown for one flow
pub(crate) fn metrics(flow: &Flow) -> String {
    let m = FlowMetrics::compute(flow);
    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", flow.name, flow.id);
    let _ = writeln!(out, "  section           {}", flow.status.title());
    let _ = writeln!(out, "  usage             {}", m.usage);
    let _ = writeln!(out, "  utilization cost  {}", money(m.utilization_cost));
    let _ = writeln!(out, "  value             {}", money(m.value));
    let _ = writeln!(out, "  roi               {}", m.roi);
    let _ = writeln!(out, "  opportunity       {}", format_score(m.opportunity_score));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowplan_model::Section;
    use pretty_assertions::assert_eq;

    #[test]
    fn money_groups_thousands() {
        assert_eq!(money(2_400_000.0), "$2,400,000");
        assert_eq!(money(-1_500.4), "-$1,500");
        assert_eq!(money(999.0), "$999");
        assert_eq!(money(0.0), "$0");
    }

    #[test]
    fn metrics_report_marks_missing_score() {
        let flow = Flow::new("f1", "Refund", Section::Backlog);
        let text = metrics(&flow);
        assert!(text.contains("Backlog"));
        assert!(text.contains("N/A"));
    }

    #[test]
    fn metrics_report_for_priced_flow() {
        let flow = Flow::new("f1", "Refund", Section::Planning)
            .with_baseline_volume(1_000_000)
            .with_completion_rate(80.0)
            .with_value_per_occurrence(5.0)
            .with_cost_per_occurrence(2.0);
        let text = metrics(&flow);
        assert!(text.contains("800000"));
        assert!(text.contains("$1,600,000"));
        assert!(text.contains("250%"));
    }
}
