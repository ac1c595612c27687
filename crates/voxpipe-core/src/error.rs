//! Error taxonomy for the pipeline and its configuration.
//!
//! Adapters return [`PipelineError`] kinds directly; the HTTP boundary maps
//! every kind to a status code and a generic detail message, logging the full
//! chain server-side. [`ConfigError`] is startup-fatal and never reaches a
//! request handler.

use thiserror::Error;

use crate::types::Capability;

/// Per-request pipeline failures.
///
/// Upstream causes are carried as sources for server-side diagnostics; they
/// are never serialized into a client response.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Neither or both of text/audio were provided.
    #[error("provide exactly one of text or audio input")]
    InvalidInput,

    /// A provider name outside the known set for its capability.
    #[error("unsupported {capability} provider '{name}'")]
    UnsupportedProvider { capability: Capability, name: String },

    #[error("transcription failed")]
    TranscriptionFailed(#[source] anyhow::Error),

    #[error("response generation failed")]
    ResponseGenerationFailed(#[source] anyhow::Error),

    #[error("speech synthesis failed")]
    SynthesisFailed(#[source] anyhow::Error),

    /// The local synthesis service is unreachable or returned an error.
    /// Kept distinct from [`PipelineError::SynthesisFailed`]: this points at
    /// a deploy/process issue rather than a quota or key issue.
    #[error("local synthesis service unavailable")]
    LocalServiceUnavailable(#[source] anyhow::Error),
}

impl PipelineError {
    /// Whether the caller, rather than an upstream provider, is at fault.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            PipelineError::InvalidInput | PipelineError::UnsupportedProvider { .. }
        )
    }
}

/// Malformed provider configuration — fatal at startup, never per-request.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An active selection names a provider with no implementation.
    #[error("no {capability} adapter for configured provider '{name}'")]
    UnknownProvider { capability: Capability, name: String },
}
