//! Static seed records the logs are merged over

use anyhow::Context;
use flowplan_model::{Agent, Flow};
use serde::Deserialize;
use std::path::Path;

/// Seed document: `{"flows": [...], "agents": [...]}`
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct Baseline {
    #[serde(default)]
    pub(crate) flows: Vec<Flow>,
    #[serde(default)]
    pub(crate) agents: Vec<Agent>,
}

impl Baseline {
    pub(crate) fn from_json(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("baseline is not a valid seed document")
    }

    pub(crate) async fn load(path: &Path) -> anyhow::Result<Self> {
        let json = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read baseline {}", path.display()))?;
        let baseline = Self::from_json(&json)?;
        tracing::debug!(
            flows = baseline.flows.len(),
            agents = baseline.agents.len(),
            "loaded baseline"
        );
        Ok(baseline)
    }
}
