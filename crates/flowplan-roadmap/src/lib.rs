//! Flowplan Roadmap
//!
//! Classifies flows into three ordered sections, keeps their priorities
//! contiguous, gates entry to Ready behind field completeness and turns drag
//! gestures into section transitions.
//!
//! # Core Concepts
//!
//! - [`SectionStore`]: Ready / Planning / Backlog collections and the only
//!   writer of `priority` and `status`
//! - [`can_enter_ready`]: Promotion rule for the gated section
//! - [`DragCoordinator`]: `Idle -> Dragging -> Hovering -> Idle` state machine
//! - [`NoticeBoard`]: Section-scoped validation notices with expiry
//! - [`sort_flows`]: Display ordering that leaves priorities untouched
//!
//! # Example
//!
//! ```rust,ignore
//! use flowplan_roadmap::{DragCoordinator, NoticeBoard, SectionStore};
//!
//! let mut store = SectionStore::from_flows(flows);
//! let mut drag = DragCoordinator::default();
//! drag.start(id, Section::Backlog);
//! drag.hover(Section::Planning, 0);
//! let outcome = drag.drop(&mut store, &mut notices, Instant::now())?;
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod drag;
mod error;
mod notice;
mod sections;
mod sort;
mod validation;

pub use drag::{DragCoordinator, DragState, DropIndicator, DropOutcome};
pub use error::{InvariantViolation, RoadmapError, ValidationFailure};
pub use notice::{NoticeBoard, SectionNotice, DEFAULT_NOTICE_TTL};
pub use sections::{SectionStore, Transition};
pub use sort::{sort_flows, SortColumn, SortDirection, SortSpec};
pub use validation::{can_enter, can_enter_ready, can_enter_ready_from_planning_or_backlog, READY_REQUIRED};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
