//! Generation orchestration: resolve an agent, synthesize its prompt, call
//! the backend, and normalize the result, across single, batched, streamed
//! and press-conference modes.
//!
//! Batch items and conference turns run strictly sequentially in input
//! order; the only shared state is the read-only directory behind an `Arc`.
//! Per-item failures in batch and conference modes are recorded and never
//! abort the remaining items.

pub mod events;
pub mod extract;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde_json::{Map, Value};
use tokio::sync::mpsc;

use crate::llms::backend::{ChatMessage, GenerationBackend, GenerationOptions};
use crate::llms::streaming::{StreamAccumulator, StreamChunk};
use crate::profiles::MediaDirectory;
use crate::prompts;
use crate::types::{
    AgentKind, AgentRequest, BatchItemError, BatchResponse, ConferenceTurn, GenerationMetadata,
    GenerationResult, PressConferenceRequest, PressConferenceSummary,
};
use crate::utilities::errors::SimulationError;

pub use events::SimulationEvent;

const STREAM_SYSTEM_PROMPT: &str = "你是一个专业的新闻仿真生成器";
const DEFAULT_TEMPERATURE: f64 = 0.7;
const DEFAULT_MAX_TOKENS: u32 = 300;
const CONFERENCE_MAX_TOKENS: u32 = 200;
const EVENT_BUFFER: usize = 32;

/// Pacing delay between conference questioners, emulating live turn-taking.
/// Fixed by default; configurable, but not load-sensitive.
const DEFAULT_CONFERENCE_DELAY: Duration = Duration::from_secs(1);

/// The generation orchestrator. Cheap to clone: all heavy state is shared.
#[derive(Clone)]
pub struct Orchestrator {
    directory: Arc<MediaDirectory>,
    user_profiles: Arc<HashMap<String, Value>>,
    backend: Arc<dyn GenerationBackend>,
    conference_delay: Duration,
}

impl Orchestrator {
    pub fn new(
        directory: Arc<MediaDirectory>,
        user_profiles: Arc<HashMap<String, Value>>,
        backend: Arc<dyn GenerationBackend>,
    ) -> Self {
        Self {
            directory,
            user_profiles,
            backend,
            conference_delay: DEFAULT_CONFERENCE_DELAY,
        }
    }

    /// Override the inter-questioner pacing delay.
    pub fn with_conference_delay(mut self, delay: Duration) -> Self {
        self.conference_delay = delay;
        self
    }

    pub fn directory(&self) -> &MediaDirectory {
        &self.directory
    }

    pub fn user_profiles(&self) -> &HashMap<String, Value> {
        &self.user_profiles
    }

    pub fn model(&self) -> &str {
        self.backend.model()
    }

    /// Resolve the agent and synthesize its prompt. Caller-supplied
    /// attribute overrides win on key conflict.
    fn build_prompt(&self, request: &AgentRequest) -> Result<String, SimulationError> {
        let kind: AgentKind = request.agent_type.parse()?;
        let prompt = match kind {
            AgentKind::Media => {
                let profile = self.directory.find(&request.agent_id).ok_or_else(|| {
                    SimulationError::AgentNotFound {
                        identifier: request.agent_id.clone(),
                    }
                })?;
                let base = serde_json::to_value(profile).unwrap_or(Value::Null);
                let attributes = merge_attributes(base, &request.attributes);
                prompts::media_prompt(&request.topic, &attributes, &request.context)
            }
            AgentKind::User => {
                let profile = self.user_profiles.get(&request.agent_id).ok_or_else(|| {
                    SimulationError::AgentNotFound {
                        identifier: request.agent_id.clone(),
                    }
                })?;
                let attributes = merge_attributes(profile.clone(), &request.attributes);
                prompts::user_prompt(&request.topic, &attributes, &request.context)
            }
        };
        Ok(prompt)
    }

    /// Single-item generation. Errors propagate directly to the caller.
    pub async fn generate(
        &self,
        request: &AgentRequest,
    ) -> Result<GenerationResult, SimulationError> {
        log::info!(
            "generation request: {} - {} - {}",
            request.agent_type,
            request.agent_id,
            request.topic,
        );

        let prompt = self.build_prompt(request)?;
        let options = GenerationOptions {
            temperature: request.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            max_tokens: request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            stream: request.stream.unwrap_or(false),
        };
        let messages = vec![ChatMessage::system(&prompt), ChatMessage::user(&prompt)];

        let (content, usage) = if options.stream {
            let mut receiver = self.backend.stream(messages, &options).await?;
            let mut accumulator = StreamAccumulator::new();
            loop {
                match receiver.next().await {
                    Some(StreamChunk::Error { message }) => {
                        return Err(SimulationError::StreamInterrupted { message });
                    }
                    Some(chunk) => {
                        if accumulator.push(&chunk) {
                            break;
                        }
                    }
                    None => break,
                }
            }
            let usage = accumulator.usage();
            (accumulator.into_text(), usage)
        } else {
            let completion = self.backend.complete(messages, &options).await?;
            (extract::extract_content(&completion), completion.usage)
        };

        let content = content.trim().to_string();
        log::info!(
            "generation succeeded: {} - {} - length {}",
            request.agent_type,
            request.agent_id,
            content.chars().count(),
        );

        Ok(GenerationResult {
            agent_id: request.agent_id.clone(),
            agent_type: request.agent_type.clone(),
            content,
            metadata: GenerationMetadata {
                model: self.backend.model().to_string(),
                temperature: options.temperature,
                max_tokens: options.max_tokens,
                stream: options.stream,
                tokens_used: usage.unwrap_or_default(),
                prompt_length: prompt.chars().count(),
            },
        })
    }

    /// Batch generation: items run sequentially; each failure is recorded
    /// and the remaining items continue.
    pub async fn generate_batch(&self, requests: &[AgentRequest]) -> BatchResponse {
        let mut results = Vec::new();
        let mut errors = Vec::new();

        for request in requests {
            let mut item = request.clone();
            item.stream = Some(false);
            match self.generate(&item).await {
                Ok(result) => results.push(result),
                Err(e) => {
                    log::warn!(
                        "batch item failed: {} - {}: {}",
                        request.agent_type,
                        request.agent_id,
                        e,
                    );
                    errors.push(BatchItemError {
                        agent_id: request.agent_id.clone(),
                        agent_type: request.agent_type.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        BatchResponse {
            success_count: results.len(),
            error_count: errors.len(),
            results,
            errors,
        }
    }

    /// Single-agent streaming generation.
    ///
    /// Resolution and prompt synthesis happen before the stream opens, so
    /// lookup failures surface as an error return rather than an event. The
    /// returned channel yields `start`, one `content` per non-empty chunk in
    /// arrival order, then exactly one of `end` or `error`.
    pub async fn stream_generate(
        &self,
        request: AgentRequest,
    ) -> Result<mpsc::Receiver<SimulationEvent>, SimulationError> {
        log::info!(
            "streaming request: {} - {} - {}",
            request.agent_type,
            request.agent_id,
            request.topic,
        );

        let prompt = self.build_prompt(&request)?;
        let options = GenerationOptions {
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            stream: true,
        };
        let messages = vec![ChatMessage::system(STREAM_SYSTEM_PROMPT), ChatMessage::user(prompt)];
        let mut receiver = self.backend.stream(messages, &options).await?;

        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        tokio::spawn(async move {
            let start = SimulationEvent::stream_start(request.agent_id, request.agent_type);
            if tx.send(start).await.is_err() {
                return;
            }
            loop {
                match receiver.next().await {
                    Some(StreamChunk::TextDelta { text }) => {
                        if !text.is_empty() && tx.send(SimulationEvent::content(text)).await.is_err()
                        {
                            return;
                        }
                    }
                    Some(StreamChunk::Done { .. }) | None => {
                        let _ = tx.send(SimulationEvent::end()).await;
                        return;
                    }
                    Some(StreamChunk::Error { message }) => {
                        let _ = tx.send(SimulationEvent::error(message)).await;
                        return;
                    }
                }
            }
        });
        Ok(rx)
    }

    /// Default questioner lineup: the first 5 Aligned outlets in directory
    /// order, then the first 2 outlets with any other label.
    pub fn default_conference_lineup(&self) -> Vec<String> {
        let mut aligned = Vec::new();
        let mut others = Vec::new();
        for (id, profile) in self.directory.iter() {
            if profile.taiwan_issue_analysis.stance_label == "Aligned" {
                aligned.push(id.to_string());
            } else {
                others.push(id.to_string());
            }
        }
        aligned.truncate(5);
        others.truncate(2);
        aligned.extend(others);
        aligned
    }

    /// Non-streaming press conference: every questioner's turn runs in
    /// order; a failed turn contributes a placeholder with an error field.
    pub async fn simulate_press_conference(
        &self,
        request: &PressConferenceRequest,
    ) -> PressConferenceSummary {
        let media_ids = if request.media_ids.is_empty() {
            self.default_conference_lineup()
        } else {
            request.media_ids.clone()
        };

        let mut questions = Vec::new();
        for media_id in &media_ids {
            let turn = conference_turn_request(media_id, &request.topic, &request.context);
            match self.generate(&turn).await {
                Ok(result) => questions.push(ConferenceTurn::Answered(result)),
                Err(e) => {
                    log::warn!("questioner {} failed: {}", media_id, e);
                    questions.push(ConferenceTurn::Failed {
                        agent_id: media_id.clone(),
                        error: e.to_string(),
                        content: String::new(),
                    });
                }
            }
        }

        PressConferenceSummary {
            topic: request.topic.clone(),
            context: request.context.clone(),
            total_media: questions.len(),
            questions,
        }
    }

    /// Streaming press conference. Each questioner's failure emits an
    /// `error` event scoped to that questioner; the sequence always runs to
    /// the final `end`.
    pub fn stream_press_conference(
        &self,
        request: PressConferenceRequest,
    ) -> mpsc::Receiver<SimulationEvent> {
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let orchestrator = self.clone();

        tokio::spawn(async move {
            let media_ids = if request.media_ids.is_empty() {
                orchestrator.default_conference_lineup()
            } else {
                request.media_ids.clone()
            };

            let start = SimulationEvent::conference_start(&request.topic, media_ids.len());
            if tx.send(start).await.is_err() {
                return;
            }

            for (index, media_id) in media_ids.iter().enumerate() {
                let media_name = match orchestrator.directory.find(media_id) {
                    Some(profile) => profile.basic_info.name.clone(),
                    None => {
                        let event = SimulationEvent::agent_error(
                            media_id,
                            format!("agent '{}' not found", media_id),
                        );
                        if tx.send(event).await.is_err() {
                            return;
                        }
                        continue;
                    }
                };

                let event = SimulationEvent::MediaStart {
                    media_id: media_id.clone(),
                    media_name,
                    index,
                };
                if tx.send(event).await.is_err() {
                    return;
                }

                let turn = conference_turn_request(media_id, &request.topic, &request.context);
                match orchestrator.generate(&turn).await {
                    Ok(result) => {
                        let question = SimulationEvent::Question {
                            media_id: media_id.clone(),
                            question: result.content,
                        };
                        if tx.send(question).await.is_err() {
                            return;
                        }
                        let media_end = SimulationEvent::MediaEnd {
                            media_id: media_id.clone(),
                        };
                        if tx.send(media_end).await.is_err() {
                            return;
                        }
                        tokio::time::sleep(orchestrator.conference_delay).await;
                    }
                    Err(e) => {
                        log::warn!("questioner {} failed: {}", media_id, e);
                        let event = SimulationEvent::agent_error(media_id, e.to_string());
                        if tx.send(event).await.is_err() {
                            return;
                        }
                    }
                }
            }

            let _ = tx.send(SimulationEvent::conference_end()).await;
        });

        rx
    }
}

/// Merge caller overrides onto the resolved profile attributes; an override
/// wins on key conflict.
fn merge_attributes(base: Value, overrides: &Map<String, Value>) -> Value {
    let mut merged = match base {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    for (key, value) in overrides {
        merged.insert(key.clone(), value.clone());
    }
    Value::Object(merged)
}

fn conference_turn_request(media_id: &str, topic: &str, context: &str) -> AgentRequest {
    AgentRequest {
        agent_type: "media".to_string(),
        agent_id: media_id.to_string(),
        topic: topic.to_string(),
        attributes: Map::new(),
        context: context.to_string(),
        temperature: Some(DEFAULT_TEMPERATURE),
        max_tokens: Some(CONFERENCE_MAX_TOKENS),
        stream: Some(false),
    }
}
