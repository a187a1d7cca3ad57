//! GLM chat-completions provider (open.bigmodel.cn).
//!
//! Speaks the ZhipuAI v4 chat API over reqwest: JSON request body, bearer
//! auth, and SSE `data:` frames in streaming mode. Failures surface as
//! [`SimulationError::Backend`] carrying the upstream message; calls are not
//! retried here.

use async_trait::async_trait;
use futures::StreamExt;
use serde_json::Value;
use uuid::Uuid;

use crate::llms::backend::{ChatCompletion, ChatMessage, GenerationBackend, GenerationOptions};
use crate::llms::streaming::{ChannelStreamReceiver, StreamChunk, StreamReceiver};
use crate::types::TokenUsage;
use crate::utilities::errors::SimulationError;

const DEFAULT_BASE_URL: &str = "https://open.bigmodel.cn/api/paas/v4";
const REQUEST_TIMEOUT_SECS: u64 = 120;
const STREAM_BUFFER: usize = 32;

/// GLM chat-completions client.
#[derive(Debug, Clone)]
pub struct GlmClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    thinking_enabled: bool,
}

impl GlmClient {
    /// Create a client against the public GLM endpoint.
    pub fn new(model: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_base_url(model, api_key, DEFAULT_BASE_URL)
    }

    /// Create a client with a custom base URL (mock servers, gateways).
    pub fn with_base_url(
        model: impl Into<String>,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into(),
            model: model.into(),
            thinking_enabled: false,
        }
    }

    /// Enable or disable the model's thinking mode.
    pub fn with_thinking(mut self, enabled: bool) -> Self {
        self.thinking_enabled = enabled;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    /// Build the JSON request body for a chat-completions call.
    fn build_request_body(
        &self,
        messages: &[ChatMessage],
        options: &GenerationOptions,
        stream: bool,
    ) -> Value {
        let mut body = serde_json::json!({
            "model": self.model,
            "messages": messages,
            "temperature": options.temperature,
            "max_tokens": options.max_tokens,
            "stream": stream,
        });
        if self.thinking_enabled {
            body["thinking"] = serde_json::json!({ "type": "enabled" });
        }
        body
    }
}

/// Extract usage counts from a response or chunk object, zero-filling
/// missing fields.
fn parse_usage(value: Option<&Value>) -> Option<TokenUsage> {
    let usage = value?;
    if !usage.is_object() {
        return None;
    }
    let field = |key: &str| usage.get(key).and_then(Value::as_i64).unwrap_or(0);
    Some(TokenUsage {
        prompt_tokens: field("prompt_tokens"),
        completion_tokens: field("completion_tokens"),
        total_tokens: field("total_tokens"),
    })
}

/// Parse a complete (non-streaming) chat response body.
fn parse_completion(response: &Value) -> Result<ChatCompletion, SimulationError> {
    let message = response
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|choice| choice.get("message"))
        .ok_or_else(|| SimulationError::backend("no choices in chat response"))?;

    let content = message
        .get("content")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string();
    let reasoning_content = message
        .get("reasoning_content")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    Ok(ChatCompletion {
        content,
        reasoning_content,
        usage: parse_usage(response.get("usage")),
    })
}

/// Extract the payload of one SSE line; `None` for comments, blank lines and
/// non-data fields.
fn parse_sse_payload(line: &str) -> Option<&str> {
    line.strip_prefix("data:").map(str::trim)
}

#[async_trait]
impl GenerationBackend for GlmClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        options: &GenerationOptions,
    ) -> Result<ChatCompletion, SimulationError> {
        let call_id = Uuid::new_v4();
        log::debug!(
            "glm call started: call_id={}, model={}, messages={}, temperature={}",
            call_id,
            self.model,
            messages.len(),
            options.temperature,
        );

        let body = self.build_request_body(&messages, options, false);
        let response = self
            .http
            .post(self.endpoint())
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| SimulationError::backend(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_else(|_| "(no body)".into());
            return Err(SimulationError::Backend {
                message: format!("chat API returned {}: {}", status, detail),
            });
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| SimulationError::backend(format!("invalid chat response: {}", e)))?;
        let completion = parse_completion(&payload)?;
        log::debug!(
            "glm call completed: call_id={}, content_len={}",
            call_id,
            completion.content.len(),
        );
        Ok(completion)
    }

    async fn stream(
        &self,
        messages: Vec<ChatMessage>,
        options: &GenerationOptions,
    ) -> Result<Box<dyn StreamReceiver>, SimulationError> {
        let body = self.build_request_body(&messages, options, true);
        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| SimulationError::backend(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_else(|_| "(no body)".into());
            return Err(SimulationError::Backend {
                message: format!("chat API returned {}: {}", status, detail),
            });
        }

        let (tx, rx) = ChannelStreamReceiver::pair(STREAM_BUFFER);
        tokio::spawn(async move {
            let mut byte_stream = response.bytes_stream();
            let mut buffer = String::new();
            let mut usage: Option<TokenUsage> = None;

            while let Some(next) = byte_stream.next().await {
                let bytes = match next {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        let _ = tx.send(StreamChunk::Error { message: e.to_string() }).await;
                        return;
                    }
                };
                buffer.push_str(&String::from_utf8_lossy(&bytes));

                while let Some(pos) = buffer.find('\n') {
                    let line = buffer[..pos].trim_end_matches('\r').to_string();
                    buffer.drain(..=pos);

                    let Some(payload) = parse_sse_payload(&line) else {
                        continue;
                    };
                    if payload == "[DONE]" {
                        let _ = tx.send(StreamChunk::Done { usage }).await;
                        return;
                    }

                    let chunk: Value = match serde_json::from_str(payload) {
                        Ok(chunk) => chunk,
                        Err(e) => {
                            let message = format!("invalid stream payload: {}", e);
                            let _ = tx.send(StreamChunk::Error { message }).await;
                            return;
                        }
                    };
                    if let Some(u) = parse_usage(chunk.get("usage")) {
                        usage = Some(u);
                    }
                    let delta = chunk
                        .get("choices")
                        .and_then(|c| c.get(0))
                        .and_then(|choice| choice.get("delta"))
                        .and_then(|delta| delta.get("content"))
                        .and_then(Value::as_str)
                        .unwrap_or("");
                    if !delta.is_empty() {
                        let text = delta.to_string();
                        if tx.send(StreamChunk::TextDelta { text }).await.is_err() {
                            // Consumer hung up; nothing left to deliver to.
                            return;
                        }
                    }
                }
            }

            // The transport ended without a [DONE] frame; treat as done.
            let _ = tx.send(StreamChunk::Done { usage }).await;
        });

        Ok(Box::new(rx))
    }
}
