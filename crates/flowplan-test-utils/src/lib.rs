//! Testing utilities for the flowplan workspace
//!
//! Shared fixtures: flows in known states, a small seeded baseline and a
//! roadmap backed by an in-memory store.

#![allow(missing_docs)]

use flowplan_core::{Roadmap, RoadmapConfig, RoadmapSnapshot};
use flowplan_model::{Agent, Complexity, ContentItem, ContentVariant, Flow, Link, Section};
use flowplan_overlay::MemoryStore;
use std::sync::Arc;

/// Flow with every Ready requirement filled in
pub fn complete_flow(id: &str, status: Section) -> Flow {
    Flow::new(id, format!("Flow {id}"), status)
        .with_baseline_volume(10_000)
        .with_completion_rate(50.0)
        .with_value_per_occurrence(4.0)
        .with_cost_per_occurrence(1.0)
        .with_complexity(Complexity::Simple)
}

/// Flow priced like [`complete_flow`] but with no completion rate
pub fn incomplete_flow(id: &str, status: Section) -> Flow {
    let mut flow = complete_flow(id, status);
    flow.completion_rate = None;
    flow
}

/// 1,000,000 runs a year at 80% deflection, $5 value and $2 price per run
pub fn scenario_flow() -> Flow {
    Flow::new("refund-status", "Refund status lookup", Section::Planning)
        .with_category("Billing")
        .with_role("Support")
        .with_baseline_volume(1_000_000)
        .with_completion_rate(80.0)
        .with_value_per_occurrence(5.0)
        .with_cost_per_occurrence(2.0)
        .with_complexity(Complexity::Moderate)
}

pub fn seed_agents() -> Vec<Agent> {
    vec![
        Agent::new("billing", "Billing assistant").with_owner("finance-ops"),
        Agent::new("it-help", "IT helpdesk").with_owner("it"),
    ]
}

/// Two flows per section, spread across the seed agents
pub fn seed_flows() -> Vec<Flow> {
    vec![
        complete_flow("invoice-copy", Section::Ready)
            .with_agent("billing")
            .with_priority(1)
            .with_content(ContentItem::new("Charter", ContentVariant::Charter)),
        complete_flow("password-reset", Section::Ready)
            .with_agent("it-help")
            .with_priority(2),
        scenario_flow()
            .with_agent("billing")
            .with_priority(1)
            .with_content(ContentItem::new("Charter", ContentVariant::Charter))
            .with_content(ContentItem::new("Call transcripts", ContentVariant::Reference))
            .with_content(ContentItem::new("Out of scope", ContentVariant::Scope))
            .with_link(Link::new("Runbook", "https://wiki.example.com/refunds")),
        Flow::new("vpn-setup", "VPN setup", Section::Planning)
            .with_agent("it-help")
            .with_priority(2),
        incomplete_flow("plan-change", Section::Backlog)
            .with_agent("billing")
            .with_priority(1),
        Flow::new("laptop-order", "Laptop order", Section::Backlog)
            .with_agent("it-help")
            .with_priority(2),
    ]
}

/// Roadmap over the seed baseline with empty logs
pub fn setup_test_roadmap() -> Roadmap<MemoryStore> {
    setup_test_roadmap_with_store(Arc::new(MemoryStore::new()))
}

pub fn setup_test_roadmap_with_store(store: Arc<MemoryStore>) -> Roadmap<MemoryStore> {
    Roadmap::new(RoadmapConfig::default(), seed_flows(), seed_agents(), store)
}

/// Flow ids of one section as rendered
pub fn rendered_ids(snapshot: &RoadmapSnapshot, section: Section) -> Vec<String> {
    snapshot
        .section(section)
        .map(|view| view.rows.iter().map(|r| r.flow.id.to_string()).collect())
        .unwrap_or_default()
}
