//! The typed event protocol for streamed generation.
//!
//! Each event is one discrete wire message carrying an `event` discriminator.
//! Single-agent streams emit `start` → `content`* → `end` | `error`.
//! Press-conference streams emit `start`, then per questioner
//! `media_start` → `question` → `media_end` (or a per-agent `error`), and a
//! final `end`. In both shapes `end` or `error` is always last.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SimulationEvent {
    /// Stream opening. Single-agent streams echo the agent; conference
    /// streams carry the topic and questioner count instead.
    Start {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        agent_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        agent_type: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        topic: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        total_media: Option<usize>,
    },

    /// A questioner takes the floor.
    MediaStart {
        media_id: String,
        media_name: String,
        index: usize,
    },

    /// The questioner's generated question.
    Question { media_id: String, question: String },

    /// The questioner's turn is over.
    MediaEnd { media_id: String },

    /// One non-empty generated text chunk, in arrival order.
    Content { chunk: String },

    /// Normal completion.
    End {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },

    /// A failure: terminal for single-agent streams; scoped to one
    /// questioner (via `media_id`) in conference streams.
    Error {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        media_id: Option<String>,
        message: String,
    },
}

impl SimulationEvent {
    pub fn stream_start(agent_id: impl Into<String>, agent_type: impl Into<String>) -> Self {
        Self::Start {
            agent_id: Some(agent_id.into()),
            agent_type: Some(agent_type.into()),
            topic: None,
            total_media: None,
        }
    }

    pub fn conference_start(topic: impl Into<String>, total_media: usize) -> Self {
        Self::Start {
            agent_id: None,
            agent_type: None,
            topic: Some(topic.into()),
            total_media: Some(total_media),
        }
    }

    pub fn content(chunk: impl Into<String>) -> Self {
        Self::Content { chunk: chunk.into() }
    }

    pub fn end() -> Self {
        Self::End { message: None }
    }

    pub fn conference_end() -> Self {
        Self::End {
            message: Some("新闻发布会结束".to_string()),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            media_id: None,
            message: message.into(),
        }
    }

    pub fn agent_error(media_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Error {
            media_id: Some(media_id.into()),
            message: message.into(),
        }
    }
}
