//! Roadmap facade
//!
//! Owns the mutation logs, the derived section store, drafts, notices and the
//! drag coordinator, and applies [`Command`]s to them one at a time.
//!
//! Reads are lazy: the section store is rebuilt from the merged logs only
//! when the log revision has moved past the one it was built from. Section
//! transitions update the store in place and write matching update records,
//! so a later rebuild reproduces the same arrangement.

use chrono::Utc;
use flowplan_model::{overlay, Agent, AgentId, EntityKind, Flow, FlowId, Section};
use flowplan_overlay::{
    DurableStore, LogDocument, MutationRecord, OverlayError, OverlayStore, PersistError,
};
use flowplan_roadmap::{
    can_enter, sort_flows, DragCoordinator, DropOutcome, NoticeBoard, RoadmapError, SectionStore,
    Transition,
};
use serde_json::{json, Map};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;

use crate::command::{Command, CommandOutcome};
use crate::config::RoadmapConfig;
use crate::draft::Drafts;
use crate::error::CoreError;
use crate::snapshot::{FlowRow, PersistenceWarning, RoadmapSnapshot, SectionView};

/// The prioritization engine for one session
#[derive(Debug)]
pub struct Roadmap<S: DurableStore> {
    config: RoadmapConfig,
    baseline_flows: Vec<Flow>,
    baseline_agents: Vec<Agent>,
    overlay: OverlayStore,
    store: Arc<S>,
    sections: SectionStore,
    agents: Vec<Agent>,
    /// Log revision `sections` and `agents` reflect
    synced: Option<u64>,
    drag: DragCoordinator,
    notices: NoticeBoard,
    drafts: Drafts,
    warnings: Vec<PersistenceWarning>,
    dirty: bool,
}

impl<S: DurableStore> Roadmap<S> {
    /// Roadmap over `baseline` with empty mutation logs
    #[must_use]
    pub fn new(
        config: RoadmapConfig,
        baseline_flows: Vec<Flow>,
        baseline_agents: Vec<Agent>,
        store: Arc<S>,
    ) -> Self {
        let drag = DragCoordinator::new(config.default_sort);
        let notices = NoticeBoard::new(config.notice_ttl());
        Self {
            config,
            baseline_flows,
            baseline_agents,
            overlay: OverlayStore::new(),
            store,
            sections: SectionStore::new(),
            agents: Vec::new(),
            synced: None,
            drag,
            notices,
            drafts: Drafts::new(),
            warnings: Vec::new(),
            dirty: false,
        }
    }

    /// Roadmap seeded from whatever the durable store holds
    ///
    /// An unreachable store is reported as a warning and the session starts
    /// from the baseline.
    ///
    /// # Errors
    /// Returns [`CoreError::Persist`] if the stored document is corrupt
    pub async fn bootstrap(
        config: RoadmapConfig,
        baseline_flows: Vec<Flow>,
        baseline_agents: Vec<Agent>,
        store: Arc<S>,
    ) -> Result<Self, CoreError> {
        let mut roadmap = Self::new(config, baseline_flows, baseline_agents, store);
        match roadmap.store.load().await {
            Ok(Some(document)) => roadmap.overlay.import(document),
            Ok(None) => tracing::debug!(store = roadmap.store.name(), "no stored logs"),
            Err(err @ PersistError::Corrupt(_)) => return Err(err.into()),
            Err(err) => roadmap.warn(&err),
        }
        roadmap.refresh();
        tracing::info!(
            flows = roadmap.sections.len(),
            agents = roadmap.agents.len(),
            records = roadmap.overlay.export().len(),
            "roadmap ready"
        );
        Ok(roadmap)
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &RoadmapConfig {
        &self.config
    }

    #[inline]
    #[must_use]
    pub fn overlay(&self) -> &OverlayStore {
        &self.overlay
    }

    /// Receiver notified on every log change
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.overlay.subscribe()
    }

    #[inline]
    #[must_use]
    pub fn drafts(&self) -> &Drafts {
        &self.drafts
    }

    #[inline]
    #[must_use]
    pub fn notices(&self) -> &NoticeBoard {
        &self.notices
    }

    #[inline]
    #[must_use]
    pub fn drag(&self) -> &DragCoordinator {
        &self.drag
    }

    #[inline]
    #[must_use]
    pub fn warnings(&self) -> &[PersistenceWarning] {
        &self.warnings
    }

    pub fn take_warnings(&mut self) -> Vec<PersistenceWarning> {
        std::mem::take(&mut self.warnings)
    }

    /// Whether log changes are waiting for [`flush`](Self::flush)
    #[inline]
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Whether derived state lags the logs
    #[inline]
    #[must_use]
    pub fn is_stale(&self) -> bool {
        self.synced != Some(self.overlay.revision())
    }

    /// Rebuild derived state if the logs moved; returns whether it did
    pub fn refresh(&mut self) -> bool {
        let revision = self.overlay.revision();
        if self.synced == Some(revision) {
            return false;
        }

        let flows = self.overlay.merged(&self.baseline_flows);
        self.agents = self.overlay.merged(&self.baseline_agents);
        self.sections = SectionStore::from_flows(flows);

        let sections = &self.sections;
        self.drafts.retain(|id| sections.section_of(id.as_str()).is_some());
        let dragged_gone = self
            .drag
            .state()
            .flow_id()
            .is_some_and(|id| sections.section_of(id.as_str()).is_none());
        if dragged_gone {
            self.drag.cancel();
        }

        self.synced = Some(revision);
        tracing::debug!(revision, flows = self.sections.len(), "rebuilt sections");
        true
    }

    /// Current section store
    pub fn sections(&mut self) -> &SectionStore {
        self.refresh();
        &self.sections
    }

    pub fn flow(&mut self, id: &str) -> Option<&Flow> {
        self.refresh();
        self.sections.get(id)
    }

    pub fn agents(&mut self) -> &[Agent] {
        self.refresh();
        &self.agents
    }

    /// An agent's flows, section by section in priority order
    pub fn flows_for_agent(&mut self, agent_id: &AgentId) -> Vec<&Flow> {
        self.refresh();
        self.sections
            .flows()
            .filter(|f| f.agent_id.as_ref() == Some(agent_id))
            .collect()
    }

    /// The flow with its draft applied
    ///
    /// # Errors
    /// Returns [`RoadmapError::UnknownFlow`] if the id is not present
    pub fn draft_preview(&mut self, id: &FlowId) -> Result<Flow, CoreError> {
        self.refresh();
        let base = self
            .sections
            .get(id.as_str())
            .ok_or_else(|| RoadmapError::UnknownFlow(id.clone()))?;
        Ok(self.drafts.preview(base)?)
    }

    /// Copy of every mutation log
    #[must_use]
    pub fn export(&self) -> LogDocument {
        self.overlay.export()
    }

    /// Replace every mutation log; derived state rebuilds on next read
    pub fn import(&mut self, document: LogDocument) {
        self.overlay.import(document);
        self.dirty = true;
    }

    /// Apply one command
    ///
    /// Validation rejections and silent no-ops are outcomes, not errors.
    ///
    /// # Errors
    /// Returns [`CoreError`] for invalid edits, unknown ids and stale
    /// section references; nothing is changed in that case
    pub fn dispatch(&mut self, command: Command, now: Instant) -> Result<CommandOutcome, CoreError> {
        self.refresh();
        self.notices.prune(now);
        tracing::debug!(command = command.name(), "dispatch");

        match command {
            Command::DragStart {
                flow_id,
                source_section,
            } => {
                if !self.drag.is_enabled() {
                    return Ok(CommandOutcome::Noop);
                }
                let actual = self
                    .sections
                    .section_of(flow_id.as_str())
                    .ok_or_else(|| RoadmapError::UnknownFlow(flow_id.clone()))?;
                if actual != source_section {
                    return Err(RoadmapError::NotInSection {
                        flow_id,
                        expected: source_section,
                        actual,
                    }
                    .into());
                }
                Ok(applied(self.drag.start(flow_id, source_section)))
            }
            Command::DragOver {
                target_section,
                target_index,
            } => Ok(applied(self.drag.hover(target_section, target_index))),
            Command::Drop => self.drop(now),
            Command::DragCancel => {
                self.drag.cancel();
                Ok(CommandOutcome::Noop)
            }
            Command::Sort { spec } => {
                self.drag.set_sort(spec);
                Ok(CommandOutcome::Applied)
            }
            Command::EditField {
                flow_id,
                field,
                value,
            } => {
                let base = self
                    .sections
                    .get(flow_id.as_str())
                    .ok_or(RoadmapError::UnknownFlow(flow_id))?;
                self.drafts.edit(base, field, value)?;
                Ok(CommandOutcome::Applied)
            }
            Command::SaveDraft { flow_id } => self.save_draft(flow_id, now),
            Command::DiscardDraft { flow_id } => Ok(applied(self.drafts.discard(&flow_id))),
            Command::Promote { flow_id } => {
                let result = self.sections.promote_to_ready(&flow_id);
                self.settle(result, Section::Ready, Some(&flow_id), now)
            }
            Command::MoveToPlanning { flow_id } => {
                let result = self.sections.demote_to_planning(&flow_id);
                self.settle(result, Section::Planning, None, now)
            }
            Command::CreateFlow { flow, section } => self.create_flow(flow, section),
            Command::DeleteFlow { flow_id } => self.delete_flow(&flow_id),
            Command::CreateAgent { agent } => self.create_agent(agent),
            Command::UpdateAgent { agent_id, changes } => self.update_agent(&agent_id, &changes),
            Command::DeleteAgent { agent_id } => self.delete_agent(&agent_id),
            Command::DismissNotice { section } => Ok(applied(self.notices.dismiss(section))),
            Command::Clear => {
                self.overlay.clear();
                self.drafts.clear();
                self.drag.cancel();
                self.dirty = true;
                Ok(CommandOutcome::Applied)
            }
        }
    }

    /// Write the logs to the durable store if they changed
    ///
    /// A failure leaves in-memory state untouched, records a
    /// [`PersistenceWarning`] and keeps the logs marked dirty. Nothing is
    /// retried.
    ///
    /// # Errors
    /// Returns [`CoreError::Persist`] when the store rejects the write
    pub async fn flush(&mut self) -> Result<bool, CoreError> {
        if !self.dirty {
            return Ok(false);
        }
        let document = self.overlay.export();
        let result = if document.is_empty() {
            self.store.clear().await
        } else {
            self.store.save(&document).await
        };

        match result {
            Ok(()) => {
                self.dirty = false;
                tracing::info!(
                    store = self.store.name(),
                    records = document.len(),
                    "flushed mutation logs"
                );
                Ok(true)
            }
            Err(err) => {
                self.warn(&err);
                Err(err.into())
            }
        }
    }

    /// Render state at `now`
    pub fn snapshot(&mut self, now: Instant) -> RoadmapSnapshot {
        self.refresh();
        let sort = self.drag.sort();
        let sections = Section::ALL
            .into_iter()
            .map(|section| SectionView {
                section,
                title: section.title(),
                errored: self.notices.is_errored(section, now),
                rows: sort_flows(self.sections.section(section), sort)
                    .into_iter()
                    .map(|flow| FlowRow::new(flow.clone(), self.drafts.has_draft(&flow.id)))
                    .collect(),
            })
            .collect();

        RoadmapSnapshot {
            revision: self.overlay.revision(),
            sort,
            drag_enabled: self.drag.is_enabled(),
            indicator: self.drag.indicator(),
            sections,
            notices: self.notices.active(now).cloned().collect(),
            warnings: self.warnings.clone(),
        }
    }

    fn drop(&mut self, now: Instant) -> Result<CommandOutcome, CoreError> {
        match self.drag.drop(&mut self.sections, &mut self.notices, now)? {
            DropOutcome::Moved(touched) => {
                self.record_placement(None)?;
                Ok(CommandOutcome::Moved(touched))
            }
            DropOutcome::Rejected(failure) => Ok(CommandOutcome::Rejected(failure)),
            DropOutcome::Ignored | DropOutcome::Cancelled | DropOutcome::Unchanged => {
                Ok(CommandOutcome::Noop)
            }
        }
    }

    /// Turn a section store result into an outcome, persisting on success
    fn settle(
        &mut self,
        result: Result<Transition, RoadmapError>,
        target: Section,
        pruned: Option<&FlowId>,
        now: Instant,
    ) -> Result<CommandOutcome, CoreError> {
        match result {
            Ok(Transition::Unchanged) => Ok(CommandOutcome::Noop),
            Ok(Transition::Applied(touched)) => {
                self.notices.dismiss(target);
                self.record_placement(pruned)?;
                Ok(CommandOutcome::Moved(touched))
            }
            Err(RoadmapError::Rejected(failure)) => {
                self.notices.raise(&failure, now);
                Ok(CommandOutcome::Rejected(failure))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Update records for every flow whose section or priority differs from
    /// what the logs say
    fn placement_records(&self, pruned: Option<&FlowId>) -> Result<Vec<MutationRecord>, CoreError> {
        let persisted: HashMap<FlowId, Flow> = self
            .overlay
            .merged(&self.baseline_flows)
            .into_iter()
            .map(|f| (f.id.clone(), f))
            .collect();

        let mut records = Vec::new();
        for flow in self.sections.flows() {
            let mut changes = Map::new();
            let placed = persisted
                .get(&flow.id)
                .is_some_and(|p| p.status == flow.status && p.priority == flow.priority);
            if !placed {
                changes.insert("status".into(), json!(flow.status));
                changes.insert("priority".into(), json!(flow.priority));
            }
            if pruned == Some(&flow.id) {
                let content = serde_json::to_value(&flow.content).map_err(OverlayError::from)?;
                changes.insert("content".into(), content);
            }
            if !changes.is_empty() {
                records.push(MutationRecord::update(flow.id.as_str(), changes));
            }
        }
        Ok(records)
    }

    fn record_placement(&mut self, pruned: Option<&FlowId>) -> Result<(), CoreError> {
        let records = self.placement_records(pruned)?;
        self.commit(EntityKind::Flows, records);
        Ok(())
    }

    /// Append records that derived state already reflects
    fn commit(&mut self, kind: EntityKind, records: Vec<MutationRecord>) {
        if records.is_empty() {
            return;
        }
        let in_step = !self.is_stale();
        let revision = self.overlay.append_all(kind, records);
        if in_step {
            self.synced = Some(revision);
        }
        self.dirty = true;
    }

    fn save_draft(&mut self, flow_id: FlowId, now: Instant) -> Result<CommandOutcome, CoreError> {
        let changes = self
            .drafts
            .take(&flow_id)
            .ok_or_else(|| CoreError::NoDraft(flow_id.clone()))?;
        let Some(base) = self.sections.get(flow_id.as_str()) else {
            return Err(RoadmapError::UnknownFlow(flow_id).into());
        };

        let edited = match overlay(base, &changes) {
            Ok(edited) => edited,
            Err(err) => {
                self.drafts.restore(flow_id, changes);
                return Err(err.into());
            }
        };
        // A Ready flow must stay complete
        if let Err(failure) = can_enter(base.status, &edited) {
            self.notices.raise(&failure, now);
            self.drafts.restore(flow_id, changes);
            return Ok(CommandOutcome::Rejected(failure));
        }

        self.sections.replace(edited)?;
        tracing::debug!(flow = %flow_id, fields = changes.len(), "saved draft");
        self.commit(
            EntityKind::Flows,
            vec![MutationRecord::update(flow_id.as_str(), changes)],
        );
        Ok(CommandOutcome::Applied)
    }

    fn create_flow(&mut self, mut flow: Flow, section: Section) -> Result<CommandOutcome, CoreError> {
        if section.is_gated() {
            return Err(RoadmapError::InvalidEntrySection(section).into());
        }
        if self.sections.section_of(flow.id.as_str()).is_some() {
            return Err(RoadmapError::DuplicateFlow(flow.id).into());
        }
        if let Some(agent_id) = &flow.agent_id {
            if !self.agents.iter().any(|a| &a.id == agent_id) {
                return Err(CoreError::UnknownAgent(agent_id.clone()));
            }
        }

        let position = self.sections.section(section).len() + 1;
        flow.status = section;
        flow.priority = Some(u32::try_from(position).unwrap_or(u32::MAX));
        let record = MutationRecord::create(&flow)?;
        let id = flow.id.clone();

        self.sections.insert(flow, section, None)?;
        tracing::info!(flow = %id, %section, "created flow");
        self.commit(EntityKind::Flows, vec![record]);
        Ok(CommandOutcome::Applied)
    }

    fn delete_flow(&mut self, flow_id: &FlowId) -> Result<CommandOutcome, CoreError> {
        let (removed, renumbered) = self.sections.remove(flow_id)?;
        self.drafts.discard(flow_id);
        if self.drag.state().flow_id() == Some(flow_id) {
            self.drag.cancel();
        }

        let mut records = vec![MutationRecord::delete(flow_id.as_str())];
        records.extend(self.placement_records(None)?);
        tracing::info!(flow = %flow_id, section = %removed.status, renumbered = renumbered.len(), "deleted flow");
        self.commit(EntityKind::Flows, records);
        Ok(CommandOutcome::Moved(renumbered))
    }

    fn agent_position(&self, agent_id: &AgentId) -> Result<usize, CoreError> {
        self.agents
            .iter()
            .position(|a| &a.id == agent_id)
            .ok_or_else(|| CoreError::UnknownAgent(agent_id.clone()))
    }

    fn create_agent(&mut self, agent: Agent) -> Result<CommandOutcome, CoreError> {
        if self.agents.iter().any(|a| a.id == agent.id) {
            return Err(CoreError::DuplicateAgent(agent.id));
        }
        let record = MutationRecord::create(&agent)?;
        tracing::info!(agent = %agent.id, "created agent");
        self.agents.push(agent);
        self.commit(EntityKind::Agents, vec![record]);
        Ok(CommandOutcome::Applied)
    }

    fn update_agent(
        &mut self,
        agent_id: &AgentId,
        changes: &Map<String, serde_json::Value>,
    ) -> Result<CommandOutcome, CoreError> {
        let position = self.agent_position(agent_id)?;
        let updated = overlay(&self.agents[position], changes)?;
        self.agents[position] = updated;
        self.commit(
            EntityKind::Agents,
            vec![MutationRecord::update(agent_id.as_str(), changes.clone())],
        );
        Ok(CommandOutcome::Applied)
    }

    fn delete_agent(&mut self, agent_id: &AgentId) -> Result<CommandOutcome, CoreError> {
        let position = self.agent_position(agent_id)?;
        self.agents.remove(position);
        tracing::info!(agent = %agent_id, "deleted agent");
        self.commit(
            EntityKind::Agents,
            vec![MutationRecord::delete(agent_id.as_str())],
        );
        Ok(CommandOutcome::Applied)
    }

    fn warn(&mut self, err: &PersistError) {
        tracing::warn!(store = self.store.name(), error = %err, "durable store write failed");
        self.warnings.push(PersistenceWarning {
            message: err.to_string(),
            transient: err.is_transient(),
            at: Utc::now(),
        });
    }
}

fn applied(changed: bool) -> CommandOutcome {
    if changed {
        CommandOutcome::Applied
    } else {
        CommandOutcome::Noop
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowplan_model::FlowField;
    use flowplan_overlay::MemoryStore;
    use serde_json::json;

    fn complete(id: &str, status: Section) -> Flow {
        Flow::new(id, id, status)
            .with_baseline_volume(1_000)
            .with_completion_rate(50.0)
            .with_value_per_occurrence(4.0)
            .with_cost_per_occurrence(1.0)
    }

    fn roadmap() -> Roadmap<MemoryStore> {
        let flows = vec![
            complete("r1", Section::Ready),
            Flow::new("p1", "p1", Section::Planning),
            Flow::new("b1", "b1", Section::Backlog),
            Flow::new("b2", "b2", Section::Backlog),
        ];
        Roadmap::new(
            RoadmapConfig::default(),
            flows,
            Vec::new(),
            Arc::new(MemoryStore::new()),
        )
    }

    fn ids(roadmap: &mut Roadmap<MemoryStore>, section: Section) -> Vec<String> {
        roadmap
            .sections()
            .section(section)
            .iter()
            .map(|f| f.id.to_string())
            .collect()
    }

    #[test]
    fn section_moves_survive_a_rebuild() {
        let mut roadmap = roadmap();
        let now = Instant::now();
        roadmap
            .dispatch(
                Command::DragStart {
                    flow_id: FlowId::from("b2"),
                    source_section: Section::Backlog,
                },
                now,
            )
            .unwrap();
        roadmap
            .dispatch(
                Command::DragOver {
                    target_section: Section::Planning,
                    target_index: 0,
                },
                now,
            )
            .unwrap();
        let outcome = roadmap.dispatch(Command::Drop, now).unwrap();
        assert!(matches!(outcome, CommandOutcome::Moved(_)));
        assert!(!roadmap.is_stale());

        let rebuilt = SectionStore::from_flows(roadmap.overlay().merged(&roadmap.baseline_flows));
        let planning: Vec<&str> = rebuilt
            .section(Section::Planning)
            .iter()
            .map(|f| f.id.as_str())
            .collect();
        assert_eq!(planning, ["b2", "p1"]);
        assert_eq!(ids(&mut roadmap, Section::Planning), ["b2", "p1"]);
    }

    #[test]
    fn saving_incomplete_ready_flow_is_rejected() {
        let mut roadmap = roadmap();
        let now = Instant::now();
        roadmap
            .dispatch(
                Command::EditField {
                    flow_id: FlowId::from("r1"),
                    field: FlowField::CompletionRate,
                    value: json!(null),
                },
                now,
            )
            .unwrap();

        let outcome = roadmap
            .dispatch(Command::SaveDraft { flow_id: FlowId::from("r1") }, now)
            .unwrap();

        assert_eq!(
            outcome.rejection().unwrap().missing,
            vec![FlowField::CompletionRate]
        );
        assert!(roadmap.drafts().has_draft(&FlowId::from("r1")));
        assert_eq!(roadmap.flow("r1").unwrap().completion_rate, Some(50.0));
        assert!(roadmap.overlay().log(EntityKind::Flows).is_empty());
    }

    #[test]
    fn clear_restores_baseline() {
        let mut roadmap = roadmap();
        let now = Instant::now();
        roadmap
            .dispatch(Command::MoveToPlanning { flow_id: FlowId::from("b1") }, now)
            .unwrap();
        assert_eq!(ids(&mut roadmap, Section::Planning), ["p1", "b1"]);

        roadmap.dispatch(Command::Clear, now).unwrap();
        assert!(roadmap.is_stale());
        assert_eq!(ids(&mut roadmap, Section::Backlog), ["b1", "b2"]);
    }

    #[test]
    fn drag_start_checks_source_section() {
        let mut roadmap = roadmap();
        let err = roadmap
            .dispatch(
                Command::DragStart {
                    flow_id: FlowId::from("b1"),
                    source_section: Section::Ready,
                },
                Instant::now(),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Roadmap(RoadmapError::NotInSection { .. })
        ));
        assert!(roadmap.drag().state().is_idle());
    }
}
