//! Flowplan Model
//!
//! Typed entities for the roadmap: flows, the agents they are grouped under,
//! and the three sections a flow can live in.
//!
//! # Core Concepts
//!
//! - [`Flow`]: A single automatable workflow tracked for prioritization
//! - [`Agent`]: Owner grouping for flows
//! - [`Section`]: Ready-to-build, Planning or Backlog
//! - [`Complexity`]: 1-5 ordinal scale (Trivial … Extreme)
//! - [`Entity`]: Common surface used by the mutation overlay
//! - [`FlowField`]: Catalogue of editable flow fields with their JSON keys
//!
//! # Example
//!
//! ```rust,ignore
//! use flowplan_model::{Flow, FlowField, Section};
//!
//! let flow = Flow::new("f1", "Reset password", Section::Backlog)
//!     .with_baseline_volume(1_000_000)
//!     .with_completion_rate(80.0);
//! assert!(!flow.is_set(FlowField::CostPerOccurrence));
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod agent;
mod content;
mod entity;
mod error;
mod field;
mod flow;
mod section;

pub use agent::{Agent, AgentId};
pub use content::{ContentItem, ContentVariant, Link};
pub use entity::{overlay, Entity, EntityKind};
pub use error::ModelError;
pub use field::FlowField;
pub use flow::{Complexity, Flow, FlowId};
pub use section::Section;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
