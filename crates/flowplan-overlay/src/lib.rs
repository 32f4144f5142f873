//! Flowplan Mutation Overlay
//!
//! Append-only logs of create/update/delete records, one per entity type,
//! folded over a static baseline to reconstitute current entity state.
//!
//! # Core Concepts
//!
//! - [`MutationRecord`]: Immutable `{id, operation, data, timestamp}` entry
//! - [`MutationLog`]: Append-only record sequence for one entity type
//! - [`merge`] / [`merge_values`]: Fold a log over a baseline
//! - [`OverlayStore`]: Owns the logs, publishes a revision on every change
//! - [`LogDocument`]: Export format, one array per entity type
//! - [`DurableStore`]: Async persistence boundary ([`MemoryStore`], [`JsonFileStore`])
//!
//! # Example
//!
//! ```rust,ignore
//! use flowplan_overlay::{MutationRecord, OverlayStore};
//!
//! let mut store = OverlayStore::new();
//! store.append(EntityKind::Flows, MutationRecord::delete("f1"));
//! let flows = store.merged(&baseline);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod document;
mod durable;
mod error;
mod log;
mod merge;
mod record;
mod store;

pub use document::LogDocument;
pub use durable::{DurableStore, JsonFileStore, MemoryStore};
pub use error::{OverlayError, PersistError};
pub use log::MutationLog;
pub use merge::{merge, merge_values};
pub use record::{MutationRecord, Operation};
pub use store::OverlayStore;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
