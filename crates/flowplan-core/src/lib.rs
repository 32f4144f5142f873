//! Flowplan Core
//!
//! The roadmap as one owned value: mutation logs, derived sections, drafts,
//! notices and the drag coordinator, driven by discrete commands.
//!
//! # Core Concepts
//!
//! - [`Roadmap`]: Applies [`Command`]s synchronously and rebuilds derived
//!   state lazily from the logs
//! - [`Drafts`]: Type-checked pending edits, saved as one update record
//! - [`RoadmapSnapshot`]: Immutable render state with metrics per row
//! - [`RoadmapConfig`]: TOML-loadable settings
//!
//! Persistence is the only asynchronous step: [`Roadmap::flush`] writes the
//! logs to a [`DurableStore`](flowplan_overlay::DurableStore) and reports a
//! failure as a [`PersistenceWarning`] without rolling anything back.
//!
//! # Example
//!
//! ```rust,ignore
//! use flowplan_core::{Command, Roadmap, RoadmapConfig};
//!
//! let mut roadmap = Roadmap::bootstrap(RoadmapConfig::default(), flows, agents, store).await?;
//! roadmap.dispatch(Command::Promote { flow_id }, Instant::now())?;
//! roadmap.flush().await?;
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod command;
mod config;
mod draft;
mod error;
mod roadmap;
mod snapshot;

pub use command::{Command, CommandOutcome};
pub use config::{LogFormat, RoadmapConfig};
pub use draft::Drafts;
pub use error::CoreError;
pub use roadmap::Roadmap;
pub use snapshot::{FlowRow, PersistenceWarning, RoadmapSnapshot, SectionView};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
