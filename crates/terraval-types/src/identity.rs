//! Agent identity

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier naming which agent variant produced a result
///
/// Unlike request-scoped ids these are fixed strings (`groq`, `asi`,
/// `gemini`) so downstream consumers can key on them across runs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(pub String);

impl AgentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AgentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for AgentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for AgentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_id_serializes_as_plain_string() {
        let id = AgentId::new("groq");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"groq\"");
        assert_eq!(id.to_string(), "groq");
    }
}
