//! Agent failure taxonomy
//!
//! Every failure an agent can hit is one of these variants. None of them
//! escapes `Agent::run`: they are rendered into the `error` field of a
//! [`ValuationResult`](crate::ValuationResult) instead.

use std::time::Duration;

use thiserror::Error;

/// Message carried by every agent whose remote integration is not wired up
pub const NOT_IMPLEMENTED_MESSAGE: &str =
    "Agent remote integration not yet implemented; no valuation endpoint is configured";

/// Result type for agent operations
pub type Result<T> = std::result::Result<T, AgentError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AgentError {
    /// A required credential or setting is absent
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Network failure, HTTP timeout, non-2xx status or malformed envelope
    #[error("Remote call failed: {message}")]
    RemoteCall { message: String },

    /// The remote answer did not match the required valuation shape
    #[error("Invalid valuation response: {message}")]
    Validation { message: String },

    /// The agent exists in the roster but has no integration yet
    #[error("{message}")]
    Unimplemented { message: String },

    /// The orchestrator stopped waiting for this agent
    #[error("Agent timed out after {after:?}")]
    Timeout { after: Duration },

    /// The agent's task ended without producing a result
    #[error("Agent aborted: {message}")]
    Aborted { message: String },
}

impl AgentError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn remote(message: impl Into<String>) -> Self {
        Self::RemoteCall {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn timeout(after: Duration) -> Self {
        Self::Timeout { after }
    }

    pub fn unimplemented() -> Self {
        Self::Unimplemented {
            message: NOT_IMPLEMENTED_MESSAGE.to_string(),
        }
    }

    /// Short machine-friendly category, used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Configuration { .. } => "configuration",
            Self::RemoteCall { .. } => "remote_call",
            Self::Validation { .. } => "validation",
            Self::Unimplemented { .. } => "unimplemented",
            Self::Timeout { .. } => "timeout",
            Self::Aborted { .. } => "aborted",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unimplemented_message_is_fixed() {
        assert_eq!(AgentError::unimplemented().to_string(), NOT_IMPLEMENTED_MESSAGE);
    }

    #[test]
    fn test_display_includes_category_context() {
        let err = AgentError::configuration("GROQ_API_KEY not configured");
        assert_eq!(err.to_string(), "Configuration error: GROQ_API_KEY not configured");
        assert_eq!(err.kind(), "configuration");
        assert_eq!(
            AgentError::timeout(Duration::from_secs(30)).to_string(),
            "Agent timed out after 30s"
        );
    }

    #[test]
    fn test_sub_second_timeout_keeps_precision() {
        assert_eq!(
            AgentError::timeout(Duration::from_millis(750)).to_string(),
            "Agent timed out after 750ms"
        );
    }
}
