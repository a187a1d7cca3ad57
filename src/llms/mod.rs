//! The generation backend boundary and its providers.

pub mod backend;
pub mod providers;
pub mod streaming;

pub use backend::{ChatCompletion, ChatMessage, GenerationBackend, GenerationOptions};
pub use streaming::{StreamChunk, StreamReceiver};
