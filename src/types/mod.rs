//! Request and response contracts exposed to the transport layer.
//!
//! These are the ephemeral, per-call structures: nothing here is persisted.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::utilities::errors::SimulationError;

/// Which kind of agent a request addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentKind {
    Media,
    User,
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentKind::Media => f.write_str("media"),
            AgentKind::User => f.write_str("user"),
        }
    }
}

impl FromStr for AgentKind {
    type Err = SimulationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "media" => Ok(AgentKind::Media),
            "user" => Ok(AgentKind::User),
            other => Err(SimulationError::InvalidAgentType {
                value: other.to_string(),
            }),
        }
    }
}

/// Token accounting for one generation call. Zero-filled when the backend
/// omits usage data.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: i64,
    pub completion_tokens: i64,
    pub total_tokens: i64,
}

/// One generation request against a named agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentRequest {
    /// "media" or "user"; validated by the orchestrator.
    pub agent_type: String,
    pub agent_id: String,
    pub topic: String,
    /// Caller-supplied attribute overrides, merged over the resolved
    /// profile; an override wins on key conflict.
    #[serde(default)]
    pub attributes: Map<String, Value>,
    #[serde(default)]
    pub context: String,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
    pub stream: Option<bool>,
}

/// Echo of the effective generation parameters plus usage accounting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationMetadata {
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
    pub stream: bool,
    pub tokens_used: TokenUsage,
    pub prompt_length: usize,
}

/// The result of one successful generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResult {
    pub agent_id: String,
    pub agent_type: String,
    pub content: String,
    pub metadata: GenerationMetadata,
}

/// A batch of generation requests, processed sequentially in input order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchRequest {
    pub requests: Vec<AgentRequest>,
}

/// One recorded per-item failure from a batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchItemError {
    pub agent_id: String,
    pub agent_type: String,
    pub error: String,
}

/// Outcome of a batch run: always complete, failures recorded per item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResponse {
    pub success_count: usize,
    pub error_count: usize,
    pub results: Vec<GenerationResult>,
    pub errors: Vec<BatchItemError>,
}

/// Parameters for a press-conference simulation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PressConferenceRequest {
    pub topic: String,
    /// Explicit questioner list; when empty, the default selection applies.
    #[serde(default)]
    pub media_ids: Vec<String>,
    #[serde(default)]
    pub context: String,
    #[serde(default)]
    pub stream: bool,
}

/// One questioner's turn in a non-streaming press conference: either a full
/// result or a placeholder recording the failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConferenceTurn {
    Answered(GenerationResult),
    Failed {
        agent_id: String,
        error: String,
        content: String,
    },
}

impl ConferenceTurn {
    pub fn is_failed(&self) -> bool {
        matches!(self, ConferenceTurn::Failed { .. })
    }
}

/// The full ordered outcome of a non-streaming press conference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PressConferenceSummary {
    pub topic: String,
    pub context: String,
    pub total_media: usize,
    pub questions: Vec<ConferenceTurn>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_kind_roundtrip() {
        assert_eq!("media".parse::<AgentKind>().unwrap(), AgentKind::Media);
        assert_eq!("user".parse::<AgentKind>().unwrap(), AgentKind::User);
        assert_eq!(AgentKind::Media.to_string(), "media");
    }

    #[test]
    fn test_agent_kind_rejects_unknown() {
        let err = "robot".parse::<AgentKind>().unwrap_err();
        assert!(matches!(err, SimulationError::InvalidAgentType { .. }));
    }

    #[test]
    fn test_agent_request_defaults() {
        let req: AgentRequest = serde_json::from_str(
            r#"{"agent_type": "media", "agent_id": "新华社", "topic": "台海局势"}"#,
        )
        .unwrap();
        assert!(req.attributes.is_empty());
        assert_eq!(req.context, "");
        assert!(req.temperature.is_none());
        assert!(req.stream.is_none());
    }

    #[test]
    fn test_token_usage_zero_filled() {
        let usage = TokenUsage::default();
        assert_eq!(usage.prompt_tokens, 0);
        assert_eq!(usage.completion_tokens, 0);
        assert_eq!(usage.total_tokens, 0);
    }

    #[test]
    fn test_conference_turn_serialization() {
        let turn = ConferenceTurn::Failed {
            agent_id: "bbc".into(),
            error: "backend down".into(),
            content: String::new(),
        };
        let json = serde_json::to_value(&turn).unwrap();
        assert_eq!(json["agent_id"], "bbc");
        assert_eq!(json["content"], "");
        assert_eq!(json["error"], "backend down");
    }
}
