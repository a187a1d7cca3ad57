//! Axum route handlers for the media simulation server.
//!
//! # Routes
//!
//! - `GET  /`                          — Service banner and endpoint map
//! - `GET  /health`                    — Liveness probe with profile counts
//! - `GET  /media`                     — All media, abbreviated listing
//! - `GET  /media/:id`                 — Full profile (fuzzy id resolution)
//! - `GET  /user/:id`                  — User profile
//! - `POST /generate`                  — Single generation
//! - `POST /stream-generate`           — Single-agent SSE stream
//! - `POST /batch-generate`            — Sequential batch with error isolation
//! - `POST /simulate-press-conference` — Multi-agent simulation (JSON or SSE)
//! - `GET  /stats`                     — Counts and model
//! - `GET  /model-info`                — Backend model metadata

use std::convert::Infallible;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use futures::stream::Stream;
use serde_json::Value;
use tokio::sync::mpsc;
use tower_http::cors::CorsLayer;

use crate::orchestrator::{Orchestrator, SimulationEvent};
use crate::types::{AgentRequest, BatchRequest, PressConferenceRequest};
use crate::utilities::errors::SimulationError;

/// Shared application state: the orchestrator (which owns the read-only
/// directory) plus the start timestamp for uptime reporting.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Orchestrator,
    pub started_at: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self {
            orchestrator,
            started_at: chrono::Utc::now(),
        }
    }
}

/// Build the axum router with all routes.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/media", get(list_media_handler))
        .route("/media/:id", get(get_media_handler))
        .route("/user/:id", get(get_user_handler))
        .route("/generate", post(generate_handler))
        .route("/stream-generate", post(stream_generate_handler))
        .route("/batch-generate", post(batch_generate_handler))
        .route("/simulate-press-conference", post(press_conference_handler))
        .route("/stats", get(stats_handler))
        .route("/model-info", get(model_info_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Map a core error to its HTTP representation.
fn error_response(err: &SimulationError) -> (StatusCode, Json<Value>) {
    let status = match err {
        SimulationError::AgentNotFound { .. } => StatusCode::NOT_FOUND,
        SimulationError::InvalidAgentType { .. } => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    tracing::warn!("request failed: {} ({})", err, status);
    (status, Json(serde_json::json!({ "error": err.to_string() })))
}

/// Forward orchestrator events to the client as SSE `data:` frames.
fn sse_from_events(
    rx: mpsc::Receiver<SimulationEvent>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = futures::stream::unfold(rx, |mut rx| async move {
        let event = rx.recv().await?;
        let frame = Event::default()
            .json_data(&event)
            .unwrap_or_else(|_| Event::default().data("{}"));
        Some((Ok::<_, Infallible>(frame), rx))
    });
    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// GET / — service banner.
async fn root_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "service": "News Media Simulation API",
        "version": crate::VERSION,
        "model": state.orchestrator.model(),
        "endpoints": {
            "媒体数据": "/media/{media_id}",
            "所有媒体": "/media",
            "用户数据": "/user/{user_id}",
            "生成内容": "/generate",
            "流式生成": "/stream-generate",
            "批量生成": "/batch-generate",
            "模拟发布会": "/simulate-press-conference"
        }
    }))
}

/// GET /health — liveness probe.
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let uptime = chrono::Utc::now() - state.started_at;
    Json(serde_json::json!({
        "status": "healthy",
        "uptime_seconds": uptime.num_seconds(),
        "model": state.orchestrator.model(),
        "media_count": state.orchestrator.directory().len(),
        "user_count": state.orchestrator.user_profiles().len(),
    }))
}

/// GET /media — abbreviated listing of every outlet.
async fn list_media_handler(State(state): State<AppState>) -> impl IntoResponse {
    let media: Vec<Value> = state
        .orchestrator
        .directory()
        .iter()
        .map(|(id, profile)| {
            serde_json::json!({
                "id": id,
                "name": profile.basic_info.name,
                "country": profile.basic_info.country,
                "media_type": profile.basic_info.media_type,
                "ownership": profile.basic_info.ownership,
                "stance_label": profile.taiwan_issue_analysis.stance_label,
                "total_questions": profile.taiwan_issue_analysis.total_questions,
                "counter_ratio": profile.taiwan_issue_analysis.counter_ratio,
                "aligned_ratio": profile.taiwan_issue_analysis.aligned_ratio,
                "question_style": profile.generation_parameters.question_style,
            })
        })
        .collect();

    Json(serde_json::json!({ "count": media.len(), "media": media }))
}

/// GET /media/:id — full profile, fuzzy resolution.
async fn get_media_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, Json<Value>)> {
    match state.orchestrator.directory().find(&id) {
        Some(profile) => Ok(Json(profile.clone())),
        None => Err(error_response(&SimulationError::AgentNotFound {
            identifier: id,
        })),
    }
}

/// GET /user/:id — user profile, exact lookup.
async fn get_user_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, Json<Value>)> {
    match state.orchestrator.user_profiles().get(&id) {
        Some(profile) => Ok(Json(profile.clone())),
        None => Err(error_response(&SimulationError::AgentNotFound {
            identifier: id,
        })),
    }
}

/// POST /generate — single generation.
async fn generate_handler(
    State(state): State<AppState>,
    Json(request): Json<AgentRequest>,
) -> Result<impl IntoResponse, (StatusCode, Json<Value>)> {
    state
        .orchestrator
        .generate(&request)
        .await
        .map(Json)
        .map_err(|e| error_response(&e))
}

/// POST /stream-generate — single-agent SSE stream.
async fn stream_generate_handler(
    State(state): State<AppState>,
    Json(request): Json<AgentRequest>,
) -> Result<impl IntoResponse, (StatusCode, Json<Value>)> {
    let rx = state
        .orchestrator
        .stream_generate(request)
        .await
        .map_err(|e| error_response(&e))?;
    Ok(sse_from_events(rx))
}

/// POST /batch-generate — sequential batch, always completes.
async fn batch_generate_handler(
    State(state): State<AppState>,
    Json(request): Json<BatchRequest>,
) -> impl IntoResponse {
    Json(state.orchestrator.generate_batch(&request.requests).await)
}

/// POST /simulate-press-conference — JSON summary or SSE per `stream`.
async fn press_conference_handler(
    State(state): State<AppState>,
    Json(request): Json<PressConferenceRequest>,
) -> Response {
    if request.topic.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "需要提供议题" })),
        )
            .into_response();
    }

    if request.stream {
        let rx = state.orchestrator.stream_press_conference(request);
        sse_from_events(rx).into_response()
    } else {
        Json(state.orchestrator.simulate_press_conference(&request).await).into_response()
    }
}

/// GET /stats — directory counts and the active model.
async fn stats_handler(State(state): State<AppState>) -> impl IntoResponse {
    let uptime = chrono::Utc::now() - state.started_at;
    Json(serde_json::json!({
        "media_count": state.orchestrator.directory().len(),
        "user_count": state.orchestrator.user_profiles().len(),
        "model": state.orchestrator.model(),
        "uptime_seconds": uptime.num_seconds(),
    }))
}

/// GET /model-info — backend model metadata.
async fn model_info_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "model": state.orchestrator.model(),
        "provider": "ZhipuAI",
        "capabilities": ["chat-completion", "streaming", "thinking"],
        "max_tokens": 4096,
        "supports_streaming": true,
        "supports_thinking": true,
    }))
}
