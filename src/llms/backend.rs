//! The generation-backend boundary.
//!
//! The orchestrator consumes the backend strictly as: given role-tagged
//! messages and parameters, return generated text or a chunk stream, or fail
//! with a backend error. Providers implement [`GenerationBackend`]; tests
//! substitute a mock.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::llms::streaming::StreamReceiver;
use crate::types::TokenUsage;
use crate::utilities::errors::SimulationError;

/// One role-tagged message in a chat exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Effective sampling parameters for one backend call.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GenerationOptions {
    pub temperature: f64,
    pub max_tokens: u32,
    pub stream: bool,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 300,
            stream: false,
        }
    }
}

/// A completed, non-streaming backend response.
///
/// `content` may be empty while `reasoning_content` is populated; the
/// orchestrator applies its extraction fallback in that case.
#[derive(Debug, Clone, Default)]
pub struct ChatCompletion {
    pub content: String,
    pub reasoning_content: Option<String>,
    pub usage: Option<TokenUsage>,
}

/// The external generative-text service, consumed as a black box.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// The backend's model identifier, echoed into result metadata.
    fn model(&self) -> &str;

    /// Run one complete (non-streaming) generation.
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        options: &GenerationOptions,
    ) -> Result<ChatCompletion, SimulationError>;

    /// Start a streaming generation; the receiver yields text chunks in
    /// arrival order followed by exactly one terminal chunk.
    async fn stream(
        &self,
        messages: Vec<ChatMessage>,
        options: &GenerationOptions,
    ) -> Result<Box<dyn StreamReceiver>, SimulationError>;
}
