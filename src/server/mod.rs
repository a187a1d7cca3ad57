//! HTTP transport for the media simulation service.
//!
//! The core consumes this layer only as "receive a structured request,
//! return a structured response or an event stream"; all decision logic
//! lives in the orchestrator.

pub mod routes;

pub use routes::{app_router, AppState};
