//! Drag/drop coordination
//!
//! The coordinator owns the in-flight drag and is the only place that turns
//! pointer events into section store calls:
//!
//! ```text
//! Idle -> Dragging -> Hovering -> (drop | cancel) -> Idle
//! ```
//!
//! Hover events only move the insertion indicator. Indices are positions in
//! the displayed list, which match store positions only under ascending
//! priority; under any other sort every handler is a silent no-op.

use flowplan_model::{FlowId, Section};
use serde::Serialize;
use std::time::Instant;

use crate::error::{RoadmapError, ValidationFailure};
use crate::notice::NoticeBoard;
use crate::sections::{SectionStore, Transition};
use crate::sort::SortSpec;

/// Coordinator state
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    /// A flow was picked up; no target yet
    Dragging { flow_id: FlowId, source: Section },
    /// Pointer is over a valid slot
    Hovering {
        flow_id: FlowId,
        source: Section,
        target: Section,
        index: usize,
    },
}

impl DragState {
    #[inline]
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, DragState::Idle)
    }

    #[must_use]
    pub fn flow_id(&self) -> Option<&FlowId> {
        match self {
            DragState::Idle => None,
            DragState::Dragging { flow_id, .. } | DragState::Hovering { flow_id, .. } => Some(flow_id),
        }
    }
}

/// Where the insertion line should be drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DropIndicator {
    pub section: Section,
    pub index: usize,
}

/// How a drop resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    /// Dragging is disabled or nothing was being dragged
    Ignored,
    /// Dropped outside any valid target
    Cancelled,
    /// Dropped onto its own slot
    Unchanged,
    /// Flows whose priority or status changed
    Moved(Vec<FlowId>),
    /// Destination refused the flow; a notice was raised
    Rejected(ValidationFailure),
}

impl DropOutcome {
    #[inline]
    #[must_use]
    pub fn is_moved(&self) -> bool {
        matches!(self, DropOutcome::Moved(_))
    }
}

/// Drag state machine
#[derive(Debug, Clone, Default)]
pub struct DragCoordinator {
    state: DragState,
    sort: SortSpec,
}

impl DragCoordinator {
    #[must_use]
    pub fn new(sort: SortSpec) -> Self {
        Self {
            state: DragState::Idle,
            sort,
        }
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> &DragState {
        &self.state
    }

    #[inline]
    #[must_use]
    pub fn sort(&self) -> SortSpec {
        self.sort
    }

    /// Dragging only makes sense when display order is priority order
    #[inline]
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.sort == SortSpec::by_priority()
    }

    /// Change the active sort; a drag in progress is abandoned
    pub fn set_sort(&mut self, sort: SortSpec) {
        self.sort = sort;
        if !self.is_enabled() && !self.state.is_idle() {
            tracing::debug!(column = %sort.column, "sort changed mid-drag, cancelling");
            self.state = DragState::Idle;
        }
    }

    /// Pick up a flow; returns whether the drag started
    pub fn start(&mut self, flow_id: FlowId, source: Section) -> bool {
        if !self.is_enabled() {
            return false;
        }
        tracing::trace!(%flow_id, %source, "drag start");
        self.state = DragState::Dragging { flow_id, source };
        true
    }

    /// Move the candidate slot; no section is touched
    pub fn hover(&mut self, target: Section, index: usize) -> bool {
        if !self.is_enabled() {
            return false;
        }
        let (flow_id, source) = match &self.state {
            DragState::Idle => return false,
            DragState::Dragging { flow_id, source } | DragState::Hovering { flow_id, source, .. } => {
                (flow_id.clone(), *source)
            }
        };
        self.state = DragState::Hovering {
            flow_id,
            source,
            target,
            index,
        };
        true
    }

    /// Abandon the drag
    pub fn cancel(&mut self) -> DropOutcome {
        if std::mem::take(&mut self.state).is_idle() {
            DropOutcome::Ignored
        } else {
            DropOutcome::Cancelled
        }
    }

    /// Current insertion line, if hovering
    #[must_use]
    pub fn indicator(&self) -> Option<DropIndicator> {
        match self.state {
            DragState::Hovering { target, index, .. } => Some(DropIndicator {
                section: target,
                index,
            }),
            _ => None,
        }
    }

    /// Complete the drag at the last hovered slot
    ///
    /// Same-section drops reorder; cross-section drops move. A validation
    /// failure raises a notice on the target section and is reported as
    /// [`DropOutcome::Rejected`]. The coordinator is idle afterwards whatever
    /// the result.
    ///
    /// # Errors
    /// Returns a [`RoadmapError`] other than a validation failure when the
    /// dragged flow no longer matches the store (e.g. deleted mid-drag)
    pub fn drop(
        &mut self,
        store: &mut SectionStore,
        notices: &mut NoticeBoard,
        now: Instant,
    ) -> Result<DropOutcome, RoadmapError> {
        if !self.is_enabled() {
            self.state = DragState::Idle;
            return Ok(DropOutcome::Ignored);
        }

        let (flow_id, source, target, index) = match std::mem::take(&mut self.state) {
            DragState::Idle => return Ok(DropOutcome::Ignored),
            DragState::Dragging { .. } => return Ok(DropOutcome::Cancelled),
            DragState::Hovering {
                flow_id,
                source,
                target,
                index,
            } => (flow_id, source, target, index),
        };

        let result = if source == target {
            store.move_within_section(source, &flow_id, index)
        } else {
            store.move_across_sections(&flow_id, source, target, Some(index))
        };

        match result {
            Ok(Transition::Unchanged) => Ok(DropOutcome::Unchanged),
            Ok(Transition::Applied(touched)) => {
                notices.dismiss(target);
                Ok(DropOutcome::Moved(touched))
            }
            Err(RoadmapError::Rejected(failure)) => {
                notices.raise(&failure, now);
                Ok(DropOutcome::Rejected(failure))
            }
            Err(err) => Err(err),
        }
    }
}
