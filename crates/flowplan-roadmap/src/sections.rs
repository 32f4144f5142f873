//! Section store
//!
//! Holds the three ordered collections and the flow-to-section index, and is
//! the only writer of `priority` and `status`.
//!
//! # Invariants
//! - Within a section, priorities are exactly 1..N in collection order
//! - Every flow sits in exactly one section, matching its `status`
//!
//! Every operation is atomic: on error neither section is touched. After a
//! change, priorities are re-derived from order, never patched.

use flowplan_model::{Flow, FlowId, Section};
use std::collections::{HashMap, HashSet};

use crate::error::{InvariantViolation, RoadmapError};
use crate::validation::{can_enter, can_enter_ready};

/// Result of a section store operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Nothing moved (e.g. a flow dropped onto its own slot)
    Unchanged,
    /// Flows whose status, priority or content changed
    Applied(Vec<FlowId>),
}

impl Transition {
    #[inline]
    #[must_use]
    pub fn is_applied(&self) -> bool {
        matches!(self, Transition::Applied(_))
    }

    /// Touched flow ids (empty when unchanged)
    #[inline]
    #[must_use]
    pub fn touched(&self) -> &[FlowId] {
        match self {
            Transition::Unchanged => &[],
            Transition::Applied(ids) => ids,
        }
    }
}

/// The three ordered sections
#[derive(Debug, Clone, Default)]
pub struct SectionStore {
    ready: Vec<Flow>,
    planning: Vec<Flow>,
    backlog: Vec<Flow>,
    index: HashMap<FlowId, Section>,
}

impl SectionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build sections from current flow state
    ///
    /// Flows are grouped by status and ordered by their stored priority;
    /// unranked flows follow in input order. Priorities are then renumbered.
    /// Duplicate ids after the first are dropped.
    #[must_use]
    pub fn from_flows(flows: impl IntoIterator<Item = Flow>) -> Self {
        let mut store = Self::new();
        for flow in flows {
            if store.index.contains_key(&flow.id) {
                tracing::warn!(id = %flow.id, "duplicate flow dropped while building sections");
                continue;
            }
            store.index.insert(flow.id.clone(), flow.status);
            store.collection_mut(flow.status).push(flow);
        }
        for section in Section::ALL {
            store
                .collection_mut(section)
                .sort_by_key(|f| f.priority.filter(|p| *p > 0).unwrap_or(u32::MAX));
            store.renumber(section);
        }
        tracing::debug!(
            ready = store.ready.len(),
            planning = store.planning.len(),
            backlog = store.backlog.len(),
            "built sections"
        );
        store
    }

    fn collection_mut(&mut self, section: Section) -> &mut Vec<Flow> {
        match section {
            Section::Ready => &mut self.ready,
            Section::Planning => &mut self.planning,
            Section::Backlog => &mut self.backlog,
        }
    }

    /// Flows of `section` in priority order
    #[inline]
    #[must_use]
    pub fn section(&self, section: Section) -> &[Flow] {
        match section {
            Section::Ready => &self.ready,
            Section::Planning => &self.planning,
            Section::Backlog => &self.backlog,
        }
    }

    #[inline]
    #[must_use]
    pub fn section_of(&self, id: &str) -> Option<Section> {
        self.index.get(id).copied()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Flow> {
        let section = self.section_of(id)?;
        self.section(section).iter().find(|f| f.id.as_str() == id)
    }

    fn position(&self, section: Section, id: &str) -> Option<usize> {
        self.section(section).iter().position(|f| f.id.as_str() == id)
    }

    /// All flows, section by section
    pub fn flows(&self) -> impl Iterator<Item = &Flow> {
        Section::ALL.into_iter().flat_map(move |s| self.section(s).iter())
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    fn locate(&self, id: &FlowId) -> Result<(Section, usize), RoadmapError> {
        let section = self
            .section_of(id.as_str())
            .ok_or_else(|| RoadmapError::UnknownFlow(id.clone()))?;
        let position = self
            .position(section, id.as_str())
            .ok_or_else(|| RoadmapError::UnknownFlow(id.clone()))?;
        Ok((section, position))
    }

    /// Re-derive 1..N from order; returns ids whose priority changed
    fn renumber(&mut self, section: Section) -> Vec<FlowId> {
        let mut changed = Vec::new();
        for (i, flow) in self.collection_mut(section).iter_mut().enumerate() {
            let priority = u32::try_from(i + 1).unwrap_or(u32::MAX);
            if flow.priority != Some(priority) {
                flow.priority = Some(priority);
                changed.push(flow.id.clone());
            }
        }
        changed
    }

    fn applied(mut touched: Vec<FlowId>) -> Transition {
        let mut seen = HashSet::new();
        touched.retain(|id| seen.insert(id.clone()));
        Transition::Applied(touched)
    }

    /// Add a flow to a section at `index` (or the end)
    ///
    /// # Errors
    /// - [`RoadmapError::DuplicateFlow`] if the id is already present
    /// - [`RoadmapError::Rejected`] if the section is gated and the flow incomplete
    pub fn insert(
        &mut self,
        mut flow: Flow,
        section: Section,
        index: Option<usize>,
    ) -> Result<Transition, RoadmapError> {
        if self.index.contains_key(&flow.id) {
            return Err(RoadmapError::DuplicateFlow(flow.id));
        }
        can_enter(section, &flow)?;

        let id = flow.id.clone();
        flow.status = section;
        let target = self.collection_mut(section);
        let at = index.map_or(target.len(), |i| i.min(target.len()));
        target.insert(at, flow);
        self.index.insert(id.clone(), section);

        let mut touched = vec![id];
        touched.extend(self.renumber(section));
        Ok(Self::applied(touched))
    }

    /// Remove a flow and close the gap it leaves
    ///
    /// # Errors
    /// Returns [`RoadmapError::UnknownFlow`] if the id is not present
    pub fn remove(&mut self, id: &FlowId) -> Result<(Flow, Vec<FlowId>), RoadmapError> {
        let (section, position) = self.locate(id)?;
        let flow = self.collection_mut(section).remove(position);
        self.index.remove(id);
        let renumbered = self.renumber(section);
        tracing::debug!(%id, %section, "removed flow");
        Ok((flow, renumbered))
    }

    /// Swap in edited field values, keeping section placement
    ///
    /// `status` and `priority` on the incoming flow are ignored.
    ///
    /// # Errors
    /// Returns [`RoadmapError::UnknownFlow`] if the id is not present
    pub fn replace(&mut self, mut flow: Flow) -> Result<(), RoadmapError> {
        let (section, position) = self.locate(&flow.id)?;
        let slot = &mut self.collection_mut(section)[position];
        flow.status = slot.status;
        flow.priority = slot.priority;
        *slot = flow;
        Ok(())
    }

    /// Move a flow to `new_index` within its section
    ///
    /// Indices past the end clamp to the last slot.
    ///
    /// # Errors
    /// - [`RoadmapError::UnknownFlow`] if the id is not present
    /// - [`RoadmapError::NotInSection`] if the flow lives elsewhere
    pub fn move_within_section(
        &mut self,
        section: Section,
        id: &FlowId,
        new_index: usize,
    ) -> Result<Transition, RoadmapError> {
        let (actual, from) = self.locate(id)?;
        if actual != section {
            return Err(RoadmapError::NotInSection {
                flow_id: id.clone(),
                expected: section,
                actual,
            });
        }

        let collection = self.collection_mut(section);
        let to = new_index.min(collection.len().saturating_sub(1));
        if to == from {
            return Ok(Transition::Unchanged);
        }

        let flow = collection.remove(from);
        collection.insert(to, flow);
        tracing::debug!(%id, %section, from, to, "reordered flow");
        Ok(Self::applied(self.renumber(section)))
    }

    /// Move a flow between sections
    ///
    /// Entry to Ready is validated first; on failure nothing changes. The
    /// flow's status becomes the destination's and it lands at `drop_index`
    /// or the end.
    ///
    /// # Errors
    /// - [`RoadmapError::UnknownFlow`] / [`RoadmapError::NotInSection`] on a stale source
    /// - [`RoadmapError::Rejected`] when the destination refuses the flow
    pub fn move_across_sections(
        &mut self,
        id: &FlowId,
        from: Section,
        to: Section,
        drop_index: Option<usize>,
    ) -> Result<Transition, RoadmapError> {
        let (actual, position) = self.locate(id)?;
        if actual != from {
            return Err(RoadmapError::NotInSection {
                flow_id: id.clone(),
                expected: from,
                actual,
            });
        }
        if from == to {
            return match drop_index {
                Some(index) => self.move_within_section(from, id, index),
                None => Ok(Transition::Unchanged),
            };
        }

        if let Err(failure) = can_enter(to, &self.section(from)[position]) {
            tracing::warn!(%id, %from, %to, missing = ?failure.missing_labels(), "move rejected");
            return Err(failure.into());
        }

        let mut flow = self.collection_mut(from).remove(position);
        let mut touched = vec![id.clone()];
        touched.extend(self.renumber(from));

        flow.status = to;
        let target = self.collection_mut(to);
        let at = drop_index.map_or(target.len(), |i| i.min(target.len()));
        target.insert(at, flow);
        self.index.insert(id.clone(), to);
        touched.extend(self.renumber(to));

        tracing::debug!(%id, %from, %to, at, "moved flow across sections");
        Ok(Self::applied(touched))
    }

    /// Promote a flow into Ready, keeping only its charter documents
    ///
    /// # Errors
    /// - [`RoadmapError::UnknownFlow`] if the id is not present
    /// - [`RoadmapError::AlreadyInSection`] if it is already Ready
    /// - [`RoadmapError::Rejected`] if it lacks required fields
    pub fn promote_to_ready(&mut self, id: &FlowId) -> Result<Transition, RoadmapError> {
        let (from, position) = self.locate(id)?;
        if from == Section::Ready {
            return Err(RoadmapError::AlreadyInSection {
                flow_id: id.clone(),
                section: Section::Ready,
            });
        }
        can_enter_ready(&self.section(from)[position])?;

        let transition = self.move_across_sections(id, from, Section::Ready, None)?;
        if let Some(position) = self.position(Section::Ready, id.as_str()) {
            let pruned = self.ready[position].retain_charter_content();
            tracing::debug!(%id, pruned, "promoted flow to ready");
        }
        Ok(transition)
    }

    /// Move a Backlog flow to the end of Planning
    ///
    /// # Errors
    /// - [`RoadmapError::UnknownFlow`] if the id is not present
    /// - [`RoadmapError::NotInSection`] if the flow is not in Backlog
    pub fn demote_to_planning(&mut self, id: &FlowId) -> Result<Transition, RoadmapError> {
        self.move_across_sections(id, Section::Backlog, Section::Planning, None)
    }

    /// Verify contiguity and partition
    ///
    /// # Errors
    /// Returns the first violation found
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let mut seen = HashSet::new();
        for section in Section::ALL {
            for (position, flow) in self.section(section).iter().enumerate() {
                if !seen.insert(&flow.id) {
                    return Err(InvariantViolation::Duplicate(flow.id.clone()));
                }
                let expected = u32::try_from(position + 1).unwrap_or(u32::MAX);
                if flow.priority != Some(expected) {
                    return Err(InvariantViolation::PriorityGap {
                        section,
                        position,
                        expected,
                        found: flow.priority,
                    });
                }
                if flow.status != section {
                    return Err(InvariantViolation::StatusMismatch {
                        flow_id: flow.id.clone(),
                        status: flow.status,
                        section,
                    });
                }
                if self.index.get(&flow.id) != Some(&section) {
                    return Err(InvariantViolation::IndexMismatch(flow.id.clone()));
                }
            }
        }
        if seen.len() != self.index.len() {
            if let Some(orphan) = self.index.keys().find(|id| !seen.contains(id)) {
                return Err(InvariantViolation::IndexMismatch(orphan.clone()));
            }
        }
        Ok(())
    }
}
