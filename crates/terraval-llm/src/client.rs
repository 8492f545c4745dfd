//! LLM Client - an explicitly constructed handle on one provider

use std::sync::Arc;

use crate::providers::*;
use crate::types::*;

/// A cheaply cloneable handle on a single provider
#[derive(Clone)]
pub struct LLMClient {
    provider: Arc<dyn LLMProvider>,
    kind: ProviderKind,
}

impl LLMClient {
    /// Wrap an existing provider (tests pass stubs through here)
    pub fn new(provider: Arc<dyn LLMProvider>) -> Self {
        let kind = provider.kind();
        Self { provider, kind }
    }

    /// Build the provider described by `config`
    ///
    /// Fails with [`LLMError::ConfigurationError`] when a hosted provider has
    /// no API key, or when the HTTP client cannot be built.
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        if config.kind.requires_api_key() && config.api_key.is_none() {
            return Err(LLMError::ConfigurationError {
                message: format!("{} API key not configured", config.kind),
            });
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LLMError::ConfigurationError {
                message: format!("failed to build HTTP client: {}", e),
            })?;

        let provider: Arc<dyn LLMProvider> = match config.kind {
            ProviderKind::Groq | ProviderKind::OpenAICompat => {
                Arc::new(OpenAICompatProvider::new(config, http))
            }
            ProviderKind::Gemini => Arc::new(GeminiProvider::new(config, http)?),
        };

        tracing::debug!(
            provider = %config.kind,
            model = %config.model,
            base_url = %config.base_url,
            timeout = ?config.timeout,
            "constructed LLM client"
        );

        Ok(Self::new(provider))
    }

    /// Get the current provider
    pub fn provider(&self) -> &Arc<dyn LLMProvider> {
        &self.provider
    }

    /// Get the provider kind
    pub fn kind(&self) -> ProviderKind {
        self.kind
    }

    /// Complete a request using the wrapped provider
    pub async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let response = self.provider.complete(request).await?;
        if response.content.trim().is_empty() {
            return Err(LLMError::InvalidResponse {
                message: format!("{} returned empty content", self.provider.name()),
            });
        }
        Ok(response)
    }
}

impl std::fmt::Debug for LLMClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LLMClient")
            .field("provider", &self.provider.name())
            .field("kind", &self.kind)
            .finish()
    }
}
