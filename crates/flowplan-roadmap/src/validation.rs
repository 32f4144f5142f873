//! Promotion rules
//!
//! Only Ready to build is gated. A flow may enter or remain in Ready when
//! baseline volume, completion rate, value per run and cost per run are all
//! set; zero counts as unset. Planning and Backlog accept anything.

use flowplan_model::{Flow, FlowField, Section};

use crate::error::ValidationFailure;

/// Fields a flow needs before it can be built
pub const READY_REQUIRED: [FlowField; 4] = [
    FlowField::BaselineVolume,
    FlowField::CompletionRate,
    FlowField::ValuePerOccurrence,
    FlowField::CostPerOccurrence,
];

/// Check the Ready requirements
///
/// # Errors
/// Returns a [`ValidationFailure`] naming every missing field
pub fn can_enter_ready(flow: &Flow) -> Result<(), ValidationFailure> {
    let missing: Vec<FlowField> = READY_REQUIRED
        .into_iter()
        .filter(|field| !flow.is_set(*field))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationFailure {
            flow_id: flow.id.clone(),
            section: Section::Ready,
            missing,
        })
    }
}

/// Same four-field check, applied when a flow leaves Planning or Backlog
///
/// # Errors
/// Returns a [`ValidationFailure`] naming every missing field
pub fn can_enter_ready_from_planning_or_backlog(flow: &Flow) -> Result<(), ValidationFailure> {
    can_enter_ready(flow)
}

/// Check entry to any section
///
/// # Errors
/// Returns a [`ValidationFailure`] when `section` is gated and the flow is incomplete
pub fn can_enter(section: Section, flow: &Flow) -> Result<(), ValidationFailure> {
    if section.is_gated() {
        can_enter_ready_from_planning_or_backlog(flow)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> Flow {
        Flow::new("f1", "Refund", Section::Planning)
            .with_baseline_volume(1_000_000)
            .with_completion_rate(80.0)
            .with_value_per_occurrence(5.0)
            .with_cost_per_occurrence(2.0)
    }

    #[test]
    fn complete_flow_may_enter_ready() {
        assert!(can_enter_ready(&complete()).is_ok());
    }

    #[test]
    fn bare_flow_lists_all_four_fields() {
        let flow = Flow::new("f2", "Lookup", Section::Backlog);
        let failure = can_enter_ready(&flow).unwrap_err();
        assert_eq!(
            failure.missing_labels(),
            ["Baseline Volume", "Deflection Rate", "Value per Run", "Price per Run"]
        );
        assert_eq!(failure.section, Section::Ready);
    }

    #[test]
    fn zero_cost_counts_as_missing() {
        let mut flow = complete();
        flow.cost_per_occurrence = Some(0.0);
        let failure = can_enter_ready(&flow).unwrap_err();
        assert_eq!(failure.missing, vec![FlowField::CostPerOccurrence]);
    }

    #[test]
    fn planning_and_backlog_accept_anything() {
        let flow = Flow::new("f2", "Lookup", Section::Backlog);
        assert!(can_enter(Section::Planning, &flow).is_ok());
        assert!(can_enter(Section::Backlog, &flow).is_ok());
        assert!(can_enter(Section::Ready, &flow).is_err());
    }
}
