//! Roadmap commands
//!
//! Every UI event becomes one command applied synchronously by
//! [`Roadmap::dispatch`](crate::Roadmap::dispatch).

use flowplan_model::{Agent, AgentId, Flow, FlowField, FlowId, Section};
use flowplan_roadmap::{SortSpec, ValidationFailure};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A discrete user action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Command {
    /// Pick up a flow
    DragStart { flow_id: FlowId, source_section: Section },
    /// Pointer over a candidate slot
    DragOver { target_section: Section, target_index: usize },
    /// Release at the last hovered slot
    Drop,
    /// Release outside any target
    DragCancel,
    /// Change display order
    Sort { spec: SortSpec },
    /// Stage a field change in the flow's draft
    EditField {
        flow_id: FlowId,
        field: FlowField,
        value: Value,
    },
    /// Write the draft as one update record
    SaveDraft { flow_id: FlowId },
    DiscardDraft { flow_id: FlowId },
    /// Move into Ready, keeping only charter content
    Promote { flow_id: FlowId },
    /// Move a Backlog flow to the end of Planning
    MoveToPlanning { flow_id: FlowId },
    CreateFlow { flow: Flow, section: Section },
    DeleteFlow { flow_id: FlowId },
    CreateAgent { agent: Agent },
    UpdateAgent {
        agent_id: AgentId,
        changes: Map<String, Value>,
    },
    DeleteAgent { agent_id: AgentId },
    DismissNotice { section: Section },
    /// Empty every mutation log
    Clear,
}

impl Command {
    /// Short name for logging
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Command::DragStart { .. } => "drag_start",
            Command::DragOver { .. } => "drag_over",
            Command::Drop => "drop",
            Command::DragCancel => "drag_cancel",
            Command::Sort { .. } => "sort",
            Command::EditField { .. } => "edit_field",
            Command::SaveDraft { .. } => "save_draft",
            Command::DiscardDraft { .. } => "discard_draft",
            Command::Promote { .. } => "promote",
            Command::MoveToPlanning { .. } => "move_to_planning",
            Command::CreateFlow { .. } => "create_flow",
            Command::DeleteFlow { .. } => "delete_flow",
            Command::CreateAgent { .. } => "create_agent",
            Command::UpdateAgent { .. } => "update_agent",
            Command::DeleteAgent { .. } => "delete_agent",
            Command::DismissNotice { .. } => "dismiss_notice",
            Command::Clear => "clear",
        }
    }
}

/// What a command did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Silent no-op (disabled drag, drop on own slot, nothing to dismiss)
    Noop,
    /// State changed without moving flows
    Applied,
    /// Flows whose status or priority changed
    Moved(Vec<FlowId>),
    /// A gated section refused the flow; a notice is showing
    Rejected(ValidationFailure),
}

impl CommandOutcome {
    #[inline]
    #[must_use]
    pub fn is_noop(&self) -> bool {
        matches!(self, CommandOutcome::Noop)
    }

    #[inline]
    #[must_use]
    pub fn rejection(&self) -> Option<&ValidationFailure> {
        match self {
            CommandOutcome::Rejected(failure) => Some(failure),
            _ => None,
        }
    }
}
