//! Valuation agents
//!
//! Every agent, whatever its shape, answers through [`Agent::run`] and
//! never fails past it: errors become error results tagged with the
//! agent's id.

use serde::{Deserialize, Serialize};
use terraval_llm::{LLMClient, ProviderKind};
use terraval_scoring::ScoringProfile;
use terraval_types::{AgentError, AgentId, FeatureRecord, Valuation, ValuationResult};

use crate::narrative::{agent_error_from_llm, GenerationParams, Narrator};
use crate::settings::{AgentSettings, AgentShape};

pub const GROQ_AGENT: &str = "groq";
pub const ASI_AGENT: &str = "asi";
pub const GEMINI_AGENT: &str = "gemini";

/// Default roster order
pub const ROSTER: [&str; 3] = [GROQ_AGENT, ASI_AGENT, GEMINI_AGENT];

/// Local scorer followed by a grounded narrative
#[derive(Debug, Clone)]
pub struct CalculatorAgent {
    pub id: AgentId,
    pub profile: ScoringProfile,
    pub narrator: Narrator,
}

impl CalculatorAgent {
    pub async fn run(&self, record: &FeatureRecord) -> ValuationResult {
        let scored = self.profile.score(record);
        let risk_factors = scored.risk_factors();
        let narrative = self.narrator.explain(record, &scored).await;

        tracing::info!(
            agent = %self.id,
            valuation = scored.valuation,
            confidence = scored.confidence,
            fallback = narrative.is_fallback(),
            "calculator agent finished"
        );

        ValuationResult::success(
            self.id.clone(),
            Valuation {
                valuation: scored.valuation,
                confidence: scored.confidence,
                reasoning: narrative.into_text(),
                risk_factors,
            },
        )
    }
}

/// The remote model proposes the whole valuation
#[derive(Debug, Clone)]
pub struct RemoteAgent {
    pub id: AgentId,
    pub narrator: Narrator,
}

impl RemoteAgent {
    pub async fn run(&self, record: &FeatureRecord) -> ValuationResult {
        match self.narrator.propose(record).await {
            Ok(valuation) => {
                tracing::info!(agent = %self.id, valuation = valuation.valuation, "remote agent finished");
                ValuationResult::success(self.id.clone(), valuation)
            }
            Err(e) => {
                tracing::warn!(agent = %self.id, kind = e.kind(), error = %e, "remote agent failed");
                ValuationResult::failure(self.id.clone(), &e)
            }
        }
    }
}

/// The closed set of agent shapes
#[derive(Debug, Clone)]
pub enum Agent {
    Calculator(CalculatorAgent),
    Remote(RemoteAgent),
    /// Listed in the roster with no integration behind it
    Unimplemented { id: AgentId },
    /// A remote agent that could not be constructed
    Misconfigured { id: AgentId, error: AgentError },
}

/// One roster entry as shown by `terraval agents`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentDescriptor {
    pub agent: AgentId,
    pub shape: String,
    pub provider: Option<ProviderKind>,
    pub profile: Option<String>,
}

impl Agent {
    pub fn calculator(
        id: impl Into<AgentId>,
        profile: ScoringProfile,
        narrator: Narrator,
    ) -> Self {
        Self::Calculator(CalculatorAgent {
            id: id.into(),
            profile,
            narrator,
        })
    }

    pub fn remote(id: impl Into<AgentId>, client: LLMClient, params: GenerationParams) -> Self {
        Self::Remote(RemoteAgent {
            id: id.into(),
            narrator: Narrator::new(client, params),
        })
    }

    pub fn unimplemented(id: impl Into<AgentId>) -> Self {
        Self::Unimplemented { id: id.into() }
    }

    pub fn id(&self) -> &AgentId {
        match self {
            Self::Calculator(a) => &a.id,
            Self::Remote(a) => &a.id,
            Self::Unimplemented { id } | Self::Misconfigured { id, .. } => id,
        }
    }

    pub fn describe(&self) -> AgentDescriptor {
        let (shape, provider, profile) = match self {
            Self::Calculator(a) => (
                "calculator",
                a.narrator.provider_kind(),
                Some(a.profile.name.clone()),
            ),
            Self::Remote(a) => ("remote", a.narrator.provider_kind(), None),
            Self::Unimplemented { .. } => ("unimplemented", None, None),
            Self::Misconfigured { .. } => ("misconfigured", None, None),
        };
        AgentDescriptor {
            agent: self.id().clone(),
            shape: shape.to_string(),
            provider,
            profile,
        }
    }

    /// Value `record`; every failure is returned as an error result
    pub async fn run(&self, record: &FeatureRecord) -> ValuationResult {
        match self {
            Self::Calculator(agent) => agent.run(record).await,
            Self::Remote(agent) => agent.run(record).await,
            Self::Unimplemented { id } => {
                ValuationResult::failure(id.clone(), &AgentError::unimplemented())
            }
            Self::Misconfigured { id, error } => ValuationResult::failure(id.clone(), error),
        }
    }

    /// Build a roster agent by id, or `None` for an unknown id
    pub fn from_settings(id: &str, settings: &AgentSettings) -> Option<Self> {
        let (kind, profile) = match id {
            GROQ_AGENT => (ProviderKind::Groq, ScoringProfile::standard()),
            GEMINI_AGENT => (ProviderKind::Gemini, ScoringProfile::conservative()),
            ASI_AGENT => {
                if settings.asi_api_key.is_some() {
                    tracing::debug!(agent = ASI_AGENT, "credential present but integration is unimplemented");
                }
                return Some(Self::unimplemented(ASI_AGENT));
            }
            _ => return None,
        };

        let params = GenerationParams {
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
            request_timeout: settings.request_timeout(),
        };
        let client = LLMClient::from_config(&settings.provider_config(kind));

        let agent = match (settings.shape, client) {
            (AgentShape::Calculator, Ok(client)) => {
                Self::calculator(id, profile, Narrator::new(client, params))
            }
            (AgentShape::Calculator, Err(e)) => {
                tracing::warn!(
                    agent = id,
                    provider = %kind,
                    error = %e,
                    "remote explainer unavailable, narratives will use the fallback sentence"
                );
                Self::calculator(id, profile, Narrator::offline())
            }
            (AgentShape::Remote, Ok(client)) => Self::remote(id, client, params),
            (AgentShape::Remote, Err(e)) => {
                tracing::warn!(agent = id, provider = %kind, error = %e, "remote agent misconfigured");
                Self::Misconfigured {
                    id: id.into(),
                    error: agent_error_from_llm(e),
                }
            }
        };
        Some(agent)
    }

    /// The default roster, in order
    pub fn default_roster(settings: &AgentSettings) -> Vec<Self> {
        ROSTER
            .iter()
            .filter_map(|id| Self::from_settings(id, settings))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use terraval_types::NOT_IMPLEMENTED_MESSAGE;

    fn record() -> FeatureRecord {
        FeatureRecord::new(40.7128, -74.006, 750.0, 0.55, 3.0, 2).unwrap()
    }

    #[test]
    fn test_default_roster_order_and_shapes() {
        let roster = Agent::default_roster(&AgentSettings::default());
        let described: Vec<_> = roster.iter().map(Agent::describe).collect();

        assert_eq!(
            described.iter().map(|d| d.agent.as_str()).collect::<Vec<_>>(),
            vec!["groq", "asi", "gemini"]
        );
        assert_eq!(described[0].shape, "calculator");
        assert_eq!(described[0].profile.as_deref(), Some("standard"));
        // no credentials: the calculators run without a remote explainer
        assert_eq!(described[0].provider, None);
        assert_eq!(described[1].shape, "unimplemented");
        assert_eq!(described[2].profile.as_deref(), Some("conservative"));
    }

    #[test]
    fn test_keyed_calculator_has_provider() {
        let mut settings = AgentSettings::default();
        settings.gemini.api_key = Some("AIza-test".to_string());
        let agent = Agent::from_settings(GEMINI_AGENT, &settings).unwrap();
        assert_eq!(agent.describe().provider, Some(ProviderKind::Gemini));
    }

    #[test]
    fn test_unknown_id_is_none() {
        assert!(Agent::from_settings("claude", &AgentSettings::default()).is_none());
    }

    #[tokio::test]
    async fn test_calculator_without_key_still_succeeds() {
        let agent = Agent::from_settings(GROQ_AGENT, &AgentSettings::default()).unwrap();
        let result = agent.run(&record()).await;

        let valuation = result.valuation().unwrap();
        assert_eq!(result.agent.as_str(), "groq");
        assert_eq!(valuation.valuation, 1_567_500);
        assert_eq!(valuation.confidence, 85);
        assert!(!valuation.reasoning.is_empty());
    }

    #[tokio::test]
    async fn test_unimplemented_agent_returns_fixed_error() {
        let agent = Agent::from_settings(ASI_AGENT, &AgentSettings::default()).unwrap();
        let result = agent.run(&record()).await;
        assert_eq!(result.error(), Some(NOT_IMPLEMENTED_MESSAGE));
        assert_eq!(result.agent.as_str(), "asi");
    }

    #[tokio::test]
    async fn test_remote_shape_without_key_is_misconfigured() {
        let settings = AgentSettings::default().with_shape(AgentShape::Remote);
        let agent = Agent::from_settings(GROQ_AGENT, &settings).unwrap();
        assert_eq!(agent.describe().shape, "misconfigured");

        let result = agent.run(&record()).await;
        let error = result.error().unwrap();
        assert!(error.starts_with("Configuration error:"), "{}", error);
        assert!(error.contains("groq"));
    }
}
