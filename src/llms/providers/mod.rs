//! Concrete backend providers.

pub mod zhipu;

pub use zhipu::GlmClient;
