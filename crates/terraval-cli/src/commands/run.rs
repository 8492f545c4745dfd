//! `terraval run` - the whole roster plus consensus

use serde::Serialize;
use terraval_agents::{
    calculate_consensus, Agent, AgentSettings, ConsensusReport, Orchestrator, RunReport,
};

use super::{to_json, Failure, Outcome};
use crate::input;

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum ConsensusOutcome {
    Reached(ConsensusReport),
    Failed { error: String },
}

#[derive(Debug, Serialize)]
struct RunOutput {
    #[serde(flatten)]
    report: RunReport,
    consensus: ConsensusOutcome,
}

pub async fn run(settings: &AgentSettings, raw_input: Option<String>) -> Outcome {
    let raw = input::read_raw(raw_input).map_err(Failure::input)?;
    let record = input::parse_record(&raw).map_err(Failure::input)?;

    let orchestrator = Orchestrator::new(Agent::default_roster(settings))
        .with_agent_timeout(settings.agent_timeout);
    let report = orchestrator.run(record).await;

    let consensus = match calculate_consensus(&report.results, settings.confidence_threshold) {
        Ok(consensus) => ConsensusOutcome::Reached(consensus),
        Err(e) => {
            tracing::warn!(run_id = %report.run_id, error = %e, "no consensus");
            ConsensusOutcome::Failed {
                error: e.to_string(),
            }
        }
    };

    to_json(&RunOutput { report, consensus })
}
