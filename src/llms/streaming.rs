//! Streaming response plumbing for generation backends.
//!
//! A streaming call yields [`StreamChunk`] values: zero or more text deltas
//! followed by exactly one terminal chunk (`Done` or `Error`). The stream is
//! finite, one-shot, and consumer-driven: chunks are pulled off a bounded
//! channel, so ordering is deterministic and delivered chunks are never
//! revoked.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::types::TokenUsage;

/// A single chunk from a streaming generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamChunk {
    /// A partial text fragment, in arrival order.
    TextDelta { text: String },

    /// Normal exhaustion. Usage is present when the backend reported it in
    /// its final frame.
    Done { usage: Option<TokenUsage> },

    /// The chunk sequence failed mid-stream. Terminal.
    Error { message: String },
}

impl StreamChunk {
    /// Whether this chunk terminates the stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamChunk::Done { .. } | StreamChunk::Error { .. })
    }
}

/// Receiver side of a chunk stream.
#[async_trait]
pub trait StreamReceiver: Send + Sync {
    /// The next chunk, or `None` once the stream is exhausted (after the
    /// terminal chunk has been yielded).
    async fn next(&mut self) -> Option<StreamChunk>;
}

/// A [`StreamReceiver`] backed by a bounded tokio mpsc channel. Providers
/// push chunks from a background task; the bounded buffer gives pull-based
/// consumption without unbounded buildup.
pub struct ChannelStreamReceiver {
    rx: tokio::sync::mpsc::Receiver<StreamChunk>,
}

impl ChannelStreamReceiver {
    pub fn new(rx: tokio::sync::mpsc::Receiver<StreamChunk>) -> Self {
        Self { rx }
    }

    /// Create a matched sender/receiver pair.
    pub fn pair(buffer: usize) -> (tokio::sync::mpsc::Sender<StreamChunk>, Self) {
        let (tx, rx) = tokio::sync::mpsc::channel(buffer);
        (tx, Self { rx })
    }
}

#[async_trait]
impl StreamReceiver for ChannelStreamReceiver {
    async fn next(&mut self) -> Option<StreamChunk> {
        self.rx.recv().await
    }
}

/// Accumulates a chunk stream into the complete response text.
#[derive(Default)]
pub struct StreamAccumulator {
    text: String,
    usage: Option<TokenUsage>,
}

impl StreamAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process one chunk; returns `true` once the stream is done.
    pub fn push(&mut self, chunk: &StreamChunk) -> bool {
        match chunk {
            StreamChunk::TextDelta { text } => {
                self.text.push_str(text);
                false
            }
            StreamChunk::Done { usage } => {
                self.usage = *usage;
                true
            }
            StreamChunk::Error { .. } => true,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn usage(&self) -> Option<TokenUsage> {
        self.usage
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_serde_tags() {
        let delta = StreamChunk::TextDelta { text: "你好".into() };
        let json = serde_json::to_string(&delta).unwrap();
        assert!(json.contains("text_delta"));

        let done = StreamChunk::Done { usage: None };
        assert!(done.is_terminal());
        let err = StreamChunk::Error { message: "timeout".into() };
        assert!(err.is_terminal());
    }

    #[test]
    fn test_accumulator_collects_deltas() {
        let mut acc = StreamAccumulator::new();
        assert!(!acc.push(&StreamChunk::TextDelta { text: "请问".into() }));
        assert!(!acc.push(&StreamChunk::TextDelta { text: "发言人".into() }));
        let done = acc.push(&StreamChunk::Done {
            usage: Some(TokenUsage {
                prompt_tokens: 10,
                completion_tokens: 5,
                total_tokens: 15,
            }),
        });
        assert!(done);
        assert_eq!(acc.text(), "请问发言人");
        assert_eq!(acc.usage().unwrap().total_tokens, 15);
    }

    #[test]
    fn test_accumulator_error_is_terminal() {
        let mut acc = StreamAccumulator::new();
        acc.push(&StreamChunk::TextDelta { text: "部分".into() });
        let done = acc.push(&StreamChunk::Error { message: "连接中断".into() });
        assert!(done);
        // Already-delivered text stands.
        assert_eq!(acc.text(), "部分");
    }

    #[tokio::test]
    async fn test_channel_stream_receiver() {
        let (tx, mut rx) = ChannelStreamReceiver::pair(8);

        tx.send(StreamChunk::TextDelta { text: "hi".into() }).await.unwrap();
        tx.send(StreamChunk::Done { usage: None }).await.unwrap();
        drop(tx);

        assert!(matches!(rx.next().await, Some(StreamChunk::TextDelta { .. })));
        assert!(matches!(rx.next().await, Some(StreamChunk::Done { .. })));
        assert!(rx.next().await.is_none());
    }
}
