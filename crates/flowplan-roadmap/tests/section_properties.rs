//! Section store behaviour under arbitrary gesture sequences.
//!
//! Covers:
//! - Priorities stay 1..N in every section after any sequence of moves.
//! - Every flow stays in exactly one section matching its status.
//! - Reorder and rejection scenarios from the roadmap board.

use flowplan_model::{Flow, FlowId, Section};
use flowplan_roadmap::{
    DragCoordinator, DropOutcome, NoticeBoard, RoadmapError, SectionStore,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::time::Instant;

fn complete(id: &str, status: Section) -> Flow {
    Flow::new(id, id, status)
        .with_baseline_volume(1_000)
        .with_completion_rate(50.0)
        .with_value_per_occurrence(4.0)
        .with_cost_per_occurrence(1.0)
}

fn board() -> Vec<Flow> {
    vec![
        complete("r1", Section::Ready),
        complete("r2", Section::Ready),
        complete("p1", Section::Planning),
        Flow::new("p2", "p2", Section::Planning),
        complete("b1", Section::Backlog),
        Flow::new("b2", "b2", Section::Backlog).with_baseline_volume(10),
        Flow::new("b3", "b3", Section::Backlog),
    ]
}

#[derive(Debug, Clone)]
enum Gesture {
    Within(usize, usize),
    Across(usize, Section, Option<usize>),
    Promote(usize),
    Demote(usize),
}

fn section_strategy() -> impl Strategy<Value = Section> {
    prop_oneof![
        Just(Section::Ready),
        Just(Section::Planning),
        Just(Section::Backlog)
    ]
}

fn gesture_strategy() -> impl Strategy<Value = Gesture> {
    prop_oneof![
        (0usize..7, 0usize..9).prop_map(|(f, i)| Gesture::Within(f, i)),
        (0usize..7, section_strategy(), prop::option::of(0usize..9))
            .prop_map(|(f, s, i)| Gesture::Across(f, s, i)),
        (0usize..7).prop_map(Gesture::Promote),
        (0usize..7).prop_map(Gesture::Demote),
    ]
}

fn apply(store: &mut SectionStore, ids: &[FlowId], gesture: &Gesture) {
    let result = match gesture {
        Gesture::Within(f, index) => {
            let id = &ids[*f];
            let section = store.section_of(id.as_str()).unwrap();
            store.move_within_section(section, id, *index)
        }
        Gesture::Across(f, to, index) => {
            let id = &ids[*f];
            let from = store.section_of(id.as_str()).unwrap();
            store.move_across_sections(id, from, *to, *index)
        }
        Gesture::Promote(f) => store.promote_to_ready(&ids[*f]),
        Gesture::Demote(f) => store.demote_to_planning(&ids[*f]),
    };
    // Rejections are expected; they just must not leave partial state.
    let _ = result;
}

proptest! {
    #[test]
    fn prop_sections_stay_contiguous_and_partitioned(
        gestures in prop::collection::vec(gesture_strategy(), 0..40)
    ) {
        let flows = board();
        let ids: Vec<FlowId> = flows.iter().map(|f| f.id.clone()).collect();
        let mut store = SectionStore::from_flows(flows);

        for gesture in &gestures {
            apply(&mut store, &ids, gesture);
            prop_assert!(store.check_invariants().is_ok(), "after {:?}", gesture);
        }
        prop_assert_eq!(store.len(), ids.len());
    }

    #[test]
    fn prop_ready_only_holds_complete_flows(
        gestures in prop::collection::vec(gesture_strategy(), 0..40)
    ) {
        let flows = board();
        let ids: Vec<FlowId> = flows.iter().map(|f| f.id.clone()).collect();
        let mut store = SectionStore::from_flows(flows);

        for gesture in &gestures {
            apply(&mut store, &ids, gesture);
        }
        for flow in store.section(Section::Ready) {
            prop_assert!(flowplan_roadmap::can_enter_ready(flow).is_ok());
        }
    }

    #[test]
    fn prop_failed_moves_leave_store_untouched(f in 0usize..7, index in 0usize..9) {
        let flows = board();
        let ids: Vec<FlowId> = flows.iter().map(|f| f.id.clone()).collect();
        let mut store = SectionStore::from_flows(flows);
        let id = &ids[f];
        let from = store.section_of(id.as_str()).unwrap();
        let before: Vec<Flow> = store.flows().cloned().collect();

        if store.move_across_sections(id, from, Section::Ready, Some(index)).is_err() {
            let after: Vec<Flow> = store.flows().cloned().collect();
            prop_assert_eq!(before, after);
        }
    }
}

/// Dragging the third of five items to the top shifts the first two down.
#[test]
fn priority_three_to_position_one() {
    let flows = ["a", "b", "c", "d", "e"].map(|id| Flow::new(id, id, Section::Planning));
    let mut store = SectionStore::from_flows(flows);
    let mut notices = NoticeBoard::default();
    let mut drag = DragCoordinator::default();

    drag.start(FlowId::from("c"), Section::Planning);
    drag.hover(Section::Planning, 0);
    let outcome = drag.drop(&mut store, &mut notices, Instant::now()).unwrap();
    assert!(outcome.is_moved());

    let order: Vec<(&str, Option<u32>)> = store
        .section(Section::Planning)
        .iter()
        .map(|f| (f.id.as_str(), f.priority))
        .collect();
    assert_eq!(
        order,
        [
            ("c", Some(1)),
            ("a", Some(2)),
            ("b", Some(3)),
            ("d", Some(4)),
            ("e", Some(5)),
        ]
    );
}

/// A Backlog flow without a completion rate bounces off Ready.
#[test]
fn backlog_flow_missing_completion_rate_stays_put() {
    let incomplete = Flow::new("f", "Refund", Section::Backlog)
        .with_baseline_volume(1_000_000)
        .with_value_per_occurrence(5.0)
        .with_cost_per_occurrence(2.0);
    let mut store = SectionStore::from_flows(vec![incomplete, complete("r", Section::Ready)]);
    let mut notices = NoticeBoard::default();
    let mut drag = DragCoordinator::default();
    let now = Instant::now();

    drag.start(FlowId::from("f"), Section::Backlog);
    drag.hover(Section::Ready, 0);
    let outcome = drag.drop(&mut store, &mut notices, now).unwrap();

    let DropOutcome::Rejected(failure) = outcome else {
        panic!("expected rejection, got {outcome:?}");
    };
    assert_eq!(failure.missing_labels(), ["Deflection Rate"]);
    let notice = notices.get(Section::Ready, now).unwrap();
    assert!(notice.message.contains("Deflection Rate"));
    assert_eq!(store.section_of("f"), Some(Section::Backlog));
    assert_eq!(store.get("f").unwrap().priority, Some(1));
}

#[test]
fn promote_rejects_incomplete_flow_without_mutation() {
    let mut store = SectionStore::from_flows(vec![Flow::new("f", "f", Section::Planning)]);
    let err = store.promote_to_ready(&FlowId::from("f")).unwrap_err();
    assert_eq!(err.as_validation().unwrap().missing.len(), 4);
    assert!(matches!(err, RoadmapError::Rejected(_)));
    assert_eq!(store.section_of("f"), Some(Section::Planning));
}
