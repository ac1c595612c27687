//! Provider adapters for Voxpipe — one closed set of backends per pipeline
//! stage, all normalized to the traits in [`traits`].
//!
//! # Architecture
//!
//! - [`traits`] — [`traits::Transcribe`], [`traits::Respond`],
//!   [`traits::Synthesize`]: the capability seams the orchestrator drives
//! - [`transcription`] — OpenAI-compatible speech-to-text over multipart HTTP
//! - [`response`] — per-provider chat-history translation (openai/groq,
//!   gemini, ollama)
//! - [`synthesis`] — text-to-speech backends, including the local service
//! - [`registry`] — name → adapter resolution built once at startup

pub mod registry;
pub mod response;
pub mod synthesis;
pub mod traits;
pub mod transcription;

pub use registry::Registry;
pub use traits::{Respond, Synthesize, Transcribe};
