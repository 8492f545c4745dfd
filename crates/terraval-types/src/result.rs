//! Valuation results - the one object every agent invocation produces
//!
//! On the wire a result is either
//!
//! ```json
//! {"valuation": 1567500, "confidence": 85, "reasoning": "...", "risk_factors": [], "agent": "groq"}
//! ```
//!
//! or
//!
//! ```json
//! {"error": "...", "agent": "asi"}
//! ```
//!
//! never a mix of both.

use serde::{Deserialize, Serialize};

use crate::{AgentError, AgentId};

/// The success fields of a valuation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Valuation {
    /// Currency units, never negative
    pub valuation: u64,
    /// 0-100
    pub confidence: u8,
    pub reasoning: String,
    pub risk_factors: Vec<String>,
}

/// The failure field of a valuation result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentFailure {
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ValuationOutcome {
    Success(Valuation),
    Failure(AgentFailure),
}

/// A single agent's self-contained answer, tagged with its identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValuationResult {
    #[serde(flatten)]
    pub outcome: ValuationOutcome,
    pub agent: AgentId,
}

impl ValuationResult {
    pub fn success(agent: AgentId, valuation: Valuation) -> Self {
        Self {
            outcome: ValuationOutcome::Success(valuation),
            agent,
        }
    }

    pub fn failure(agent: AgentId, error: &AgentError) -> Self {
        Self {
            outcome: ValuationOutcome::Failure(AgentFailure {
                error: error.to_string(),
            }),
            agent,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, ValuationOutcome::Success(_))
    }

    pub fn valuation(&self) -> Option<&Valuation> {
        match &self.outcome {
            ValuationOutcome::Success(v) => Some(v),
            ValuationOutcome::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            ValuationOutcome::Success(_) => None,
            ValuationOutcome::Failure(f) => Some(&f.error),
        }
    }
}
