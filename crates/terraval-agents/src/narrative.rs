//! Narrative generation - remote explanations with a deterministic fallback
//!
//! Two modes:
//!
//! - **Grounded** ([`Narrator::explain`]): the number is already computed
//!   locally; the remote model only justifies it. Any failure falls back to
//!   a sentence built from the record and the factor breakdown.
//! - **Ungrounded** ([`Narrator::propose`]): the remote model's JSON *is*
//!   the valuation. Failures are hard errors; nothing is invented locally.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use terraval_guard::{Guard, GuardError};
use terraval_llm::{
    CompletionRequest, CompletionResponse, LLMClient, LLMError, Message, ProviderKind,
};
use terraval_scoring::{FactorBreakdown, Scored};
use terraval_types::{AgentError, FeatureRecord, Valuation};

use crate::prompts;
use crate::settings::{DEFAULT_LLM_TIMEOUT, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};

/// Parameters shared by every remote call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub temperature: f32,
    pub max_tokens: u32,
    /// The narrator stops waiting after this, whatever the transport does
    pub request_timeout: Duration,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            request_timeout: DEFAULT_LLM_TIMEOUT,
        }
    }
}

/// Grounded-mode output: where the reasoning text came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum Narrative {
    Remote { text: String },
    Fallback { text: String, reason: String },
}

impl Narrative {
    pub fn text(&self) -> &str {
        match self {
            Self::Remote { text } | Self::Fallback { text, .. } => text,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Self::Remote { text } | Self::Fallback { text, .. } => text,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }
}

/// Deterministic explanation built only from the record and the breakdown
pub fn fallback_sentence(record: &FeatureRecord, factors: &FactorBreakdown) -> String {
    let documentation = if factors.documentation_complete {
        "complete"
    } else {
        "limited"
    };
    format!(
        "Valued at {} USD per sqm for {} vegetation (NDVI {:.2}) across {:.0} sqm, \
         with a {:.2} size adjustment and {} documentation ({} document{}).",
        factors.base_price,
        factors.vegetation_tier,
        record.ndvi(),
        record.area_sqm(),
        factors.area_multiplier,
        documentation,
        record.document_count(),
        if record.document_count() == 1 { "" } else { "s" },
    )
}

/// Converts a provider failure into the agent taxonomy
pub fn agent_error_from_llm(error: LLMError) -> AgentError {
    match error {
        LLMError::ConfigurationError { message } => AgentError::configuration(message),
        other => AgentError::remote(other.to_string()),
    }
}

pub fn agent_error_from_guard(error: GuardError) -> AgentError {
    AgentError::validation(error.to_string())
}

/// Talks to one remote model on behalf of one agent
#[derive(Debug, Clone)]
pub struct Narrator {
    client: Option<LLMClient>,
    params: GenerationParams,
    guard: Guard,
}

impl Narrator {
    /// A narrator backed by a remote model
    pub fn new(client: LLMClient, params: GenerationParams) -> Self {
        Self {
            client: Some(client),
            params,
            guard: Guard::new(),
        }
    }

    /// A narrator with no remote model; grounded mode always falls back
    pub fn offline() -> Self {
        Self {
            client: None,
            params: GenerationParams::default(),
            guard: Guard::new(),
        }
    }

    pub fn provider_kind(&self) -> Option<ProviderKind> {
        self.client.as_ref().map(LLMClient::kind)
    }

    fn request(&self, system: &str, user: String) -> CompletionRequest {
        CompletionRequest::new(vec![Message::user(user)])
            .with_system(system)
            .with_temperature(self.params.temperature)
            .with_max_tokens(self.params.max_tokens)
    }

    async fn complete(
        &self,
        client: &LLMClient,
        request: CompletionRequest,
    ) -> terraval_llm::Result<CompletionResponse> {
        let after = self.params.request_timeout;
        tokio::time::timeout(after, client.complete(request))
            .await
            .unwrap_or(Err(LLMError::Timeout { after }))
    }

    /// Grounded mode: justify `scored`, never failing
    pub async fn explain(&self, record: &FeatureRecord, scored: &Scored) -> Narrative {
        let Some(client) = &self.client else {
            return Narrative::Fallback {
                text: fallback_sentence(record, &scored.factors),
                reason: "no remote explainer configured".to_string(),
            };
        };

        let prompt = prompts::grounded(record, scored);
        tracing::debug!(provider = %client.kind(), %prompt, "requesting grounded narrative");

        let request = self.request(prompts::EXPLAINER_SYSTEM, prompt);
        match self.complete(client, request).await {
            Ok(response) => Narrative::Remote {
                text: response.content.trim().to_string(),
            },
            Err(e) => {
                tracing::warn!(
                    provider = %client.kind(),
                    error = %e,
                    "remote explanation failed, using fallback narrative"
                );
                Narrative::Fallback {
                    text: fallback_sentence(record, &scored.factors),
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Ungrounded mode: the remote model proposes the whole valuation
    pub async fn propose(&self, record: &FeatureRecord) -> Result<Valuation, AgentError> {
        let client = self.client.as_ref().ok_or_else(|| {
            AgentError::configuration("no remote model configured for ungrounded valuation")
        })?;

        let request = self
            .request(prompts::APPRAISER_SYSTEM, prompts::ungrounded(record))
            .with_json_mode();
        let response = self
            .complete(client, request)
            .await
            .map_err(agent_error_from_llm)?;
        tracing::debug!(provider = %client.kind(), content = %response.content, "raw valuation response");

        self.guard
            .parse_valuation(&response.content)
            .map_err(agent_error_from_guard)
    }
}
