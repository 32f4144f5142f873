//! Overlay store
//!
//! Owns one [`MutationLog`] per entity type and is the only source of truth
//! for field values. Every change bumps a revision published on a
//! `tokio::sync::watch` channel so consumers can recompute derived views
//! lazily.

use flowplan_model::{Entity, EntityKind};
use tokio::sync::watch;

use crate::document::LogDocument;
use crate::log::MutationLog;
use crate::merge::merge;
use crate::record::MutationRecord;

/// The mutation logs plus change notification
#[derive(Debug)]
pub struct OverlayStore {
    flows: MutationLog,
    agents: MutationLog,
    revision: u64,
    notify: watch::Sender<u64>,
}

impl OverlayStore {
    #[must_use]
    pub fn new() -> Self {
        let (notify, _) = watch::channel(0);
        Self {
            flows: MutationLog::new(),
            agents: MutationLog::new(),
            revision: 0,
            notify,
        }
    }

    /// Store seeded from an exported document
    #[must_use]
    pub fn from_document(document: LogDocument) -> Self {
        let mut store = Self::new();
        store.import(document);
        store
    }

    #[inline]
    #[must_use]
    pub fn log(&self, kind: EntityKind) -> &MutationLog {
        match kind {
            EntityKind::Flows => &self.flows,
            EntityKind::Agents => &self.agents,
        }
    }

    fn log_mut(&mut self, kind: EntityKind) -> &mut MutationLog {
        match kind {
            EntityKind::Flows => &mut self.flows,
            EntityKind::Agents => &mut self.agents,
        }
    }

    /// Append a record and return the new revision
    pub fn append(&mut self, kind: EntityKind, record: MutationRecord) -> u64 {
        tracing::debug!(%kind, id = %record.id, operation = %record.operation, "append mutation");
        self.log_mut(kind).append(record);
        self.bump()
    }

    /// Append several records as one revision
    pub fn append_all(
        &mut self,
        kind: EntityKind,
        records: impl IntoIterator<Item = MutationRecord>,
    ) -> u64 {
        let log = self.log_mut(kind);
        let before = log.len();
        for record in records {
            log.append(record);
        }
        let added = self.log(kind).len() - before;
        if added == 0 {
            return self.revision;
        }
        tracing::debug!(%kind, added, "append mutations");
        self.bump()
    }

    /// Current state of entity type `T`
    #[must_use]
    pub fn merged<T: Entity>(&self, baseline: &[T]) -> Vec<T> {
        merge(baseline, self.log(T::KIND).records())
    }

    /// Copy of every log
    #[must_use]
    pub fn export(&self) -> LogDocument {
        LogDocument {
            flows: self.flows.records().to_vec(),
            agents: self.agents.records().to_vec(),
        }
    }

    /// Replace every log with the document's contents
    pub fn import(&mut self, document: LogDocument) {
        tracing::info!(records = document.len(), "import mutation logs");
        self.flows = MutationLog::from_records(document.flows);
        self.agents = MutationLog::from_records(document.agents);
        self.bump();
    }

    /// Empty every log, restoring the baseline-only view
    pub fn clear(&mut self) {
        tracing::info!(
            flows = self.flows.len(),
            agents = self.agents.len(),
            "clear mutation logs"
        );
        self.flows.clear();
        self.agents.clear();
        self.bump();
    }

    #[inline]
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Receiver that observes every revision change
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.notify.subscribe()
    }

    fn bump(&mut self) -> u64 {
        self.revision += 1;
        self.notify.send_replace(self.revision);
        self.revision
    }
}

impl Default for OverlayStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowplan_model::{Agent, Flow, Section};
    use serde_json::{json, Map};

    #[test]
    fn append_bumps_revision_and_notifies() {
        let mut store = OverlayStore::new();
        let mut rx = store.subscribe();

        let rev = store.append(EntityKind::Flows, MutationRecord::delete("f1"));
        assert_eq!(rev, 1);
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), 1);
    }

    #[test]
    fn append_all_is_one_revision() {
        let mut store = OverlayStore::new();
        let rev = store.append_all(
            EntityKind::Flows,
            vec![MutationRecord::delete("a"), MutationRecord::delete("b")],
        );
        assert_eq!(rev, 1);
        assert_eq!(store.log(EntityKind::Flows).len(), 2);

        assert_eq!(store.append_all(EntityKind::Flows, Vec::new()), 1);
    }

    #[test]
    fn logs_are_independent_per_kind() {
        let mut store = OverlayStore::new();
        store.append(EntityKind::Agents, MutationRecord::delete("shared"));

        let flows = vec![Flow::new("shared", "Refund", Section::Backlog)];
        let agents = vec![Agent::new("shared", "Support")];

        assert_eq!(store.merged(&flows).len(), 1);
        assert!(store.merged(&agents).is_empty());
    }

    #[test]
    fn clear_restores_baseline() {
        let mut store = OverlayStore::new();
        let mut changes = Map::new();
        changes.insert("name".into(), json!("changed"));
        store.append(EntityKind::Flows, MutationRecord::update("f1", changes));

        let baseline = vec![Flow::new("f1", "Refund", Section::Backlog)];
        assert_eq!(store.merged(&baseline)[0].name, "changed");

        store.clear();
        assert_eq!(store.merged(&baseline), baseline);
        assert!(store.export().is_empty());
    }
}
