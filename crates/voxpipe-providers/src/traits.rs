//! Capability traits — the seams between the orchestrator and the provider
//! backends.
//!
//! Each pipeline stage gets one trait; every backend for that stage
//! implements it. Credentials, base URLs, and model ids are baked in at
//! construction (resolved from configuration by the registry), so a call
//! site only supplies per-request data.

use std::path::Path;

use async_trait::async_trait;

use voxpipe_core::{ChatMessage, PipelineError};

/// Speech-to-text backends.
#[async_trait]
pub trait Transcribe: Send + Sync {
    /// Transcribe an audio file to text.
    ///
    /// Reads the artifact; never deletes it — artifact lifecycle belongs to
    /// the orchestrator.
    async fn transcribe(&self, audio: &Path) -> Result<String, PipelineError>;

    /// Display name for logging.
    fn display_name(&self) -> &str;
}

/// Reply-generation backends.
///
/// Each implementation translates the normalized history into its own wire
/// shape; the ordered role/content pairs must survive the translation.
#[async_trait]
pub trait Respond: Send + Sync + std::fmt::Debug {
    /// Generate a reply to the final user turn of `history`.
    async fn respond(&self, history: &[ChatMessage]) -> Result<String, PipelineError>;

    /// Display name for logging.
    fn display_name(&self) -> &str;
}

/// Text-to-speech backends.
#[async_trait]
pub trait Synthesize: Send + Sync {
    /// Render `text` as speech, writing exactly one artifact at `dest`.
    ///
    /// The caller guarantees `dest` is unique; nothing pre-existing is
    /// overwritten knowingly.
    async fn synthesize(&self, text: &str, dest: &Path) -> Result<(), PipelineError>;

    /// Display name for logging.
    fn display_name(&self) -> &str;

    /// File extension of the produced audio (no leading dot).
    fn file_ext(&self) -> &'static str;
}
