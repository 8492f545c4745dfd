//! Agent settings - credentials, models and timeouts for a roster
//!
//! Libraries never read the environment on their own; the CLI calls
//! [`AgentSettings::from_env`] once and hands the result down.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use terraval_llm::{ProviderConfig, ProviderKind};
use thiserror::Error;

pub const GROQ_API_KEY: &str = "GROQ_API_KEY";
pub const GEMINI_API_KEY: &str = "GOOGLE_GEMINI_API_KEY";
pub const ASI_API_KEY: &str = "ASI_AGENT_API_KEY";
pub const GROQ_MODEL: &str = "TERRAVAL_GROQ_MODEL";
pub const GEMINI_MODEL: &str = "TERRAVAL_GEMINI_MODEL";
pub const GROQ_BASE_URL: &str = "TERRAVAL_GROQ_BASE_URL";
pub const GEMINI_BASE_URL: &str = "TERRAVAL_GEMINI_BASE_URL";
pub const AGENT_SHAPE: &str = "TERRAVAL_AGENT_SHAPE";
pub const LLM_TIMEOUT_SECS: &str = "TERRAVAL_LLM_TIMEOUT_SECS";
pub const AGENT_TIMEOUT_SECS: &str = "TERRAVAL_AGENT_TIMEOUT_SECS";
pub const CONFIDENCE_THRESHOLD: &str = "CONFIDENCE_THRESHOLD";

pub const DEFAULT_LLM_TIMEOUT: Duration = Duration::from_secs(20);
pub const DEFAULT_AGENT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_TEMPERATURE: f32 = 0.3;
pub const DEFAULT_MAX_TOKENS: u32 = 2000;
pub const DEFAULT_CONFIDENCE_THRESHOLD: u8 = 80;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    #[error("Invalid value for {var}: {value:?} ({message})")]
    InvalidValue {
        var: &'static str,
        value: String,
        message: String,
    },
}

/// How the `groq` and `gemini` agents are built
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentShape {
    /// Local scorer plus a remote explainer
    #[default]
    Calculator,
    /// The remote model proposes the whole valuation
    Remote,
}

impl FromStr for AgentShape {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "calculator" | "grounded" => Ok(Self::Calculator),
            "remote" | "ungrounded" => Ok(Self::Remote),
            other => Err(format!(
                "unknown agent shape {:?} (expected calculator or remote)",
                other
            )),
        }
    }
}

impl fmt::Display for AgentShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Calculator => write!(f, "calculator"),
            Self::Remote => write!(f, "remote"),
        }
    }
}

/// Credential and endpoint for one hosted provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSettings {
    pub api_key: Option<String>,
    pub model: String,
    /// Overrides the provider's public endpoint (proxies, test servers)
    pub base_url: Option<String>,
}

impl ProviderSettings {
    fn defaults(kind: ProviderKind) -> Self {
        Self {
            api_key: None,
            model: kind.default_model().to_string(),
            base_url: None,
        }
    }
}

/// Everything needed to build and run an agent roster
#[derive(Debug, Clone, PartialEq)]
pub struct AgentSettings {
    pub groq: ProviderSettings,
    pub gemini: ProviderSettings,
    /// Read so operators can see it is picked up; the asi agent has no integration
    pub asi_api_key: Option<String>,
    pub shape: AgentShape,
    /// Bound on each remote HTTP request, before clamping to the agent timeout
    pub llm_timeout: Duration,
    /// Bound on each agent as a whole
    pub agent_timeout: Duration,
    pub temperature: f32,
    pub max_tokens: u32,
    pub confidence_threshold: u8,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            groq: ProviderSettings::defaults(ProviderKind::Groq),
            gemini: ProviderSettings::defaults(ProviderKind::Gemini),
            asi_api_key: None,
            shape: AgentShape::default(),
            llm_timeout: DEFAULT_LLM_TIMEOUT,
            agent_timeout: DEFAULT_AGENT_TIMEOUT,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
        }
    }
}

impl AgentSettings {
    /// Read settings from process environment variables
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read settings through `lookup`; blank values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let mut settings = Self::default();

        settings.groq.api_key = get(GROQ_API_KEY);
        settings.gemini.api_key = get(GEMINI_API_KEY);
        settings.asi_api_key = get(ASI_API_KEY);

        if let Some(model) = get(GROQ_MODEL) {
            settings.groq.model = model;
        }
        if let Some(model) = get(GEMINI_MODEL) {
            settings.gemini.model = model;
        }
        settings.groq.base_url = get(GROQ_BASE_URL);
        settings.gemini.base_url = get(GEMINI_BASE_URL);

        if let Some(raw) = get(AGENT_SHAPE) {
            settings.shape = raw.parse().map_err(|message| SettingsError::InvalidValue {
                var: AGENT_SHAPE,
                value: raw.clone(),
                message,
            })?;
        }
        if let Some(raw) = get(LLM_TIMEOUT_SECS) {
            settings.llm_timeout = parse_seconds(LLM_TIMEOUT_SECS, &raw)?;
        }
        if let Some(raw) = get(AGENT_TIMEOUT_SECS) {
            settings.agent_timeout = parse_seconds(AGENT_TIMEOUT_SECS, &raw)?;
        }
        if let Some(raw) = get(CONFIDENCE_THRESHOLD) {
            settings.confidence_threshold = raw
                .trim()
                .parse::<u8>()
                .ok()
                .filter(|v| *v <= 100)
                .ok_or_else(|| SettingsError::InvalidValue {
                    var: CONFIDENCE_THRESHOLD,
                    value: raw.clone(),
                    message: "expected an integer between 0 and 100".to_string(),
                })?;
        }

        Ok(settings)
    }

    pub fn with_shape(mut self, shape: AgentShape) -> Self {
        self.shape = shape;
        self
    }

    pub fn with_agent_timeout(mut self, timeout: Duration) -> Self {
        self.agent_timeout = timeout;
        self
    }

    /// Deadline for one remote call
    ///
    /// Always below `agent_timeout`, so a grounded agent has time left to
    /// fall back after its explainer gives up.
    pub fn request_timeout(&self) -> Duration {
        self.llm_timeout.min(self.agent_timeout * 3 / 4)
    }

    /// Provider configuration for the given hosted provider
    pub fn provider_config(&self, kind: ProviderKind) -> ProviderConfig {
        let provider = match kind {
            ProviderKind::Gemini => &self.gemini,
            ProviderKind::Groq | ProviderKind::OpenAICompat => &self.groq,
        };
        let config = ProviderConfig::new(kind, provider.api_key.clone())
            .with_model(provider.model.clone())
            .with_timeout(self.request_timeout());
        match &provider.base_url {
            Some(url) => config.with_base_url(url.clone()),
            None => config,
        }
    }
}

fn parse_seconds(var: &'static str, raw: &str) -> Result<Duration, SettingsError> {
    raw.trim()
        .parse::<u64>()
        .ok()
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
        .ok_or_else(|| SettingsError::InvalidValue {
            var,
            value: raw.to_string(),
            message: "expected a positive whole number of seconds".to_string(),
        })
}
