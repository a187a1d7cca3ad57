//! mediasim HTTP server binary.
//!
//! Loads the enriched profile data, builds the read-only agent directory
//! once, and serves the generation API over axum.
//!
//! # Environment Variables
//!
//! - `ZHIPUAI_API_KEY`  — GLM API key (required)
//! - `MODEL_NAME`       — Backend model (default: "glm-4.5-flash")
//! - `THINKING_ENABLED` — Enable the model's thinking mode (default: false)
//! - `API_HOST`         — Bind address (default: "0.0.0.0")
//! - `API_PORT`         — HTTP port (default: 8000)
//! - `MEDIA_PROFILES`   — Media profile JSON (default: "agents_data/media_profiles.json")
//! - `USER_PROFILES`    — User profile JSON (default: "agents_data/user_profiles.json")
//! - `RUST_LOG`         — Tracing filter (default: "info")
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin server
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Context;

use mediasim::server::{app_router, AppState};
use mediasim::{GlmClient, MediaDirectory, Orchestrator};

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| v.to_lowercase() == "true")
        .unwrap_or(false)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,mediasim=debug".into()),
        )
        .init();

    let api_key = std::env::var("ZHIPUAI_API_KEY")
        .context("ZHIPUAI_API_KEY environment variable is not set")?;
    let model = std::env::var("MODEL_NAME").unwrap_or_else(|_| "glm-4.5-flash".to_string());
    let thinking_enabled = env_flag("THINKING_ENABLED");

    let media_path = std::env::var("MEDIA_PROFILES")
        .unwrap_or_else(|_| "agents_data/media_profiles.json".to_string());
    let user_path = std::env::var("USER_PROFILES")
        .unwrap_or_else(|_| "agents_data/user_profiles.json".to_string());

    // A missing data file degrades to an empty directory rather than
    // refusing to start; lookups then answer not-found.
    let directory = if std::path::Path::new(&media_path).exists() {
        let directory = MediaDirectory::load(&media_path)
            .with_context(|| format!("failed to load media profiles from {}", media_path))?;
        tracing::info!("loaded {} media profiles from {}", directory.len(), media_path);
        directory
    } else {
        tracing::warn!("media profile file not found: {}", media_path);
        MediaDirectory::default()
    };

    let user_profiles = if std::path::Path::new(&user_path).exists() {
        let users = mediasim::profiles::load_user_profiles(&user_path)
            .with_context(|| format!("failed to load user profiles from {}", user_path))?;
        tracing::info!("loaded {} user profiles from {}", users.len(), user_path);
        users
    } else {
        tracing::warn!("user profile file not found: {}", user_path);
        HashMap::new()
    };

    let backend = GlmClient::new(&model, api_key).with_thinking(thinking_enabled);
    tracing::info!("GLM backend ready, model: {}", model);

    let orchestrator = Orchestrator::new(
        Arc::new(directory),
        Arc::new(user_profiles),
        Arc::new(backend),
    );

    let host = std::env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("API_PORT").unwrap_or_else(|_| "8000".to_string());
    let bind_addr = format!("{}:{}", host, port);

    let app = app_router(AppState::new(orchestrator));

    tracing::info!("mediasim server starting on {}", bind_addr);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    axum::serve(listener, app).await.context("server failed")?;

    Ok(())
}
