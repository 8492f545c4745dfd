//! `terraval agent` and `terraval agents`

use terraval_agents::{Agent, AgentSettings, ROSTER};
use terraval_types::{AgentError, ValuationResult};

use super::{to_json, Failure, Outcome};
use crate::input;

pub async fn run_one(settings: &AgentSettings, id: &str, raw_input: Option<String>) -> Outcome {
    let agent = Agent::from_settings(id, settings).ok_or_else(|| {
        Failure::input(anyhow::anyhow!(
            "Unknown agent: {} (expected one of {})",
            id,
            ROSTER.join(", ")
        ))
    })?;

    let raw = input::read_raw(raw_input).map_err(Failure::input)?;
    let record = input::parse_record(&raw).map_err(Failure::input)?;

    // a single agent still gets the per-agent timeout
    let result = match tokio::time::timeout(settings.agent_timeout, agent.run(&record)).await {
        Ok(result) => result,
        Err(_) => ValuationResult::failure(
            agent.id().clone(),
            &AgentError::timeout(settings.agent_timeout),
        ),
    };
    to_json(&result)
}

pub fn list(settings: &AgentSettings) -> Outcome {
    let descriptors: Vec<_> = Agent::default_roster(settings)
        .iter()
        .map(Agent::describe)
        .collect();
    to_json(&descriptors)
}
