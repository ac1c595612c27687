//! Transient audio artifacts.
//!
//! Two kinds of files pass through the media directory:
//!
//! - **uploads** (`upload_<uuid>.<ext>`) — input audio awaiting
//!   transcription. Owned by a single request and deleted on every exit
//!   path, success or failure, via [`InputArtifact`]'s drop guard.
//! - **outputs** (`response_<uuid>.<ext>`) — synthesized speech, retained on
//!   disk for client retrieval and never deleted by the pipeline.
//!
//! Name uniqueness (a random id per artifact) is the only concurrency-safety
//! mechanism the directory needs: each request touches only its own files.

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::warn;
use uuid::Uuid;

use voxpipe_core::PipelineError;

/// Extension of an upload filename, if it names a known audio container.
pub fn audio_extension(name: &str) -> Option<&'static str> {
    let lower = name.to_lowercase();
    for ext in [
        "ogg", "oga", "opus", "mp3", "m4a", "wav", "flac", "aac", "webm",
    ] {
        if lower.ends_with(&format!(".{ext}")) {
            return Some(ext);
        }
    }
    None
}

/// Unique output artifact name for synthesized speech.
pub fn output_filename(ext: &str) -> String {
    format!("response_{}.{}", Uuid::new_v4(), ext)
}

/// An uploaded audio file, deleted when the guard drops.
#[derive(Debug)]
pub struct InputArtifact {
    path: PathBuf,
}

impl InputArtifact {
    /// Persist uploaded bytes under `dir` with a unique name.
    ///
    /// The upload exists only as transcription input, so write failures
    /// surface as `TranscriptionFailed`.
    pub async fn write(
        dir: &Path,
        bytes: &[u8],
        original_name: Option<&str>,
    ) -> Result<Self, PipelineError> {
        let ext = original_name.and_then(audio_extension).unwrap_or("wav");
        let path = dir.join(format!("upload_{}.{}", Uuid::new_v4(), ext));

        tokio::fs::write(&path, bytes)
            .await
            .with_context(|| format!("persisting upload to {}", path.display()))
            .map_err(PipelineError::TranscriptionFailed)?;

        Ok(Self { path })
    }

    /// Location of the persisted upload.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for InputArtifact {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %self.path.display(), error = %e, "failed to remove upload artifact");
            }
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
