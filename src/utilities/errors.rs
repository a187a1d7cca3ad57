//! Error types for the media simulation core.

use thiserror::Error;

/// Errors produced by profile enrichment and generation orchestration.
#[derive(Debug, Error)]
pub enum SimulationError {
    /// A source row was missing a required field or carried a non-numeric
    /// value. Aborts the enrichment batch: ids must stay unique across the
    /// whole directory, so a partial load is worse than no load.
    #[error("malformed profile row: {message}")]
    MalformedRow { message: String },

    /// No profile matched the requested identifier, exactly or fuzzily.
    #[error("agent '{identifier}' not found")]
    AgentNotFound { identifier: String },

    /// The request named an agent kind other than "media" or "user".
    #[error("agent_type must be 'media' or 'user', got '{value}'")]
    InvalidAgentType { value: String },

    /// The generation backend failed: authentication, quota, network, or a
    /// malformed payload. Carries the upstream message verbatim.
    #[error("generation backend error: {message}")]
    Backend { message: String },

    /// A streaming response failed after chunks had already been delivered.
    /// Chunks already emitted stand; this only terminates the stream.
    #[error("stream interrupted: {message}")]
    StreamInterrupted { message: String },
}

impl SimulationError {
    /// Shorthand for a backend failure wrapping an upstream error message.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SimulationError::AgentNotFound {
            identifier: "bbc".into(),
        };
        assert!(err.to_string().contains("bbc"));

        let err = SimulationError::InvalidAgentType {
            value: "robot".into(),
        };
        assert!(err.to_string().contains("robot"));

        let err = SimulationError::backend("quota exceeded");
        assert!(err.to_string().contains("quota exceeded"));
    }
}
