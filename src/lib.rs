//! # mediasim
//!
//! News media simulation service: derives structured agent profiles for
//! media outlets and social-media users from tabular source data,
//! synthesizes generation prompts from those profiles plus a runtime topic,
//! and orchestrates calls to the GLM chat backend across single, batched,
//! streamed, and multi-agent press-conference execution modes.

pub mod llms;
pub mod orchestrator;
pub mod profiles;
pub mod prompts;
pub mod server;
pub mod types;
pub mod utilities;

pub use llms::backend::GenerationBackend;
pub use llms::providers::GlmClient;
pub use orchestrator::{Orchestrator, SimulationEvent};
pub use profiles::{MediaDirectory, MediaProfile};
pub use types::{AgentRequest, GenerationResult};
pub use utilities::errors::SimulationError;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
