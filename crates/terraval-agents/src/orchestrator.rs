//! Orchestrator - fans one record out to every agent concurrently

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use terraval_types::{AgentError, FeatureRecord, ValuationResult};
use uuid::Uuid;

use crate::agent::Agent;
use crate::settings::DEFAULT_AGENT_TIMEOUT;

/// Results of one orchestration run, in roster order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub results: Vec<ValuationResult>,
}

impl RunReport {
    pub fn successes(&self) -> impl Iterator<Item = &ValuationResult> {
        self.results.iter().filter(|r| r.is_success())
    }
}

/// Runs a roster with per-agent isolation
///
/// Each agent gets its own task and its own timeout. A slow, failing or
/// panicking agent only affects its own slot in the report.
pub struct Orchestrator {
    agents: Vec<Arc<Agent>>,
    agent_timeout: Duration,
}

impl Orchestrator {
    pub fn new(agents: Vec<Agent>) -> Self {
        Self {
            agents: agents.into_iter().map(Arc::new).collect(),
            agent_timeout: DEFAULT_AGENT_TIMEOUT,
        }
    }

    pub fn with_agent_timeout(mut self, timeout: Duration) -> Self {
        self.agent_timeout = timeout;
        self
    }

    pub async fn run(&self, record: FeatureRecord) -> RunReport {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let clock = Instant::now();

        tracing::info!(%run_id, agents = self.agents.len(), "starting valuation run");

        let handles: Vec<_> = self
            .agents
            .iter()
            .map(|agent| {
                let agent = Arc::clone(agent);
                let limit = self.agent_timeout;
                tokio::spawn(async move { tokio::time::timeout(limit, agent.run(&record)).await })
            })
            .collect();

        let joined = futures::future::join_all(handles).await;

        let results: Vec<ValuationResult> = joined
            .into_iter()
            .zip(&self.agents)
            .map(|(outcome, agent)| match outcome {
                Ok(Ok(result)) => result,
                Ok(Err(_elapsed)) => {
                    let error = AgentError::timeout(self.agent_timeout);
                    tracing::warn!(%run_id, agent = %agent.id(), "agent timed out");
                    ValuationResult::failure(agent.id().clone(), &error)
                }
                Err(join_error) => {
                    let error = AgentError::Aborted {
                        message: join_error.to_string(),
                    };
                    tracing::warn!(%run_id, agent = %agent.id(), error = %error, "agent task aborted");
                    ValuationResult::failure(agent.id().clone(), &error)
                }
            })
            .collect();

        let duration_ms = u64::try_from(clock.elapsed().as_millis()).unwrap_or(u64::MAX);
        let succeeded = results.iter().filter(|r| r.is_success()).count();
        tracing::info!(%run_id, succeeded, total = results.len(), duration_ms, "valuation run finished");

        RunReport {
            run_id,
            started_at,
            duration_ms,
            results,
        }
    }
}
