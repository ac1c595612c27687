//! Core types, configuration, and error taxonomy for Voxpipe.
//!
//! # Architecture
//!
//! - [`types`] — the normalized chat contract ([`types::ChatMessage`]),
//!   pipeline inputs/outputs, and the OpenAI-compatible wire shapes
//! - [`config`] — typed configuration loaded once at startup
//! - [`error`] — [`error::PipelineError`] (per-request) and
//!   [`error::ConfigError`] (startup-fatal)
//! - [`utils`] — path helpers

pub mod config;
pub mod error;
pub mod types;
pub mod utils;

pub use config::{load_config, Config};
pub use error::{ConfigError, PipelineError};
pub use types::{Capability, ChatHistory, ChatMessage, PipelineResult, ProviderSelection, RequestInput};
