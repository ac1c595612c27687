//! The pipeline orchestrator — one request, three sequential stages.
//!
//! Per request the state machine is `receiving → transcribing (voice only) →
//! responding → synthesizing (voice only) → done`, with any stage failure
//! absorbing into an error result. Stages never overlap within a request;
//! concurrency exists only across requests, where the freshly-built history
//! and uniquely-named artifacts keep requests fully independent.
//!
//! There is no cross-request cache or dedup — identical inputs are recomputed
//! every time.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info};

use voxpipe_core::{ChatMessage, PipelineError, PipelineResult, RequestInput};
use voxpipe_providers::Registry;

use crate::artifact::{output_filename, InputArtifact};

/// Drives the adapter stages and owns transient-artifact lifecycle.
pub struct Pipeline {
    registry: Arc<Registry>,
    media_dir: PathBuf,
    system_prompt: String,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("media_dir", &self.media_dir)
            .finish()
    }
}

impl Pipeline {
    pub fn new(
        registry: Arc<Registry>,
        media_dir: impl Into<PathBuf>,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            media_dir: media_dir.into(),
            system_prompt: system_prompt.into(),
        }
    }

    /// Run one request through the pipeline.
    ///
    /// `response_provider` is the caller-supplied name for the response
    /// stage; transcription and synthesis use the registry's process-wide
    /// selections. The upload artifact (voice input) is deleted on every
    /// exit path; the synthesized output is retained for retrieval.
    pub async fn handle(
        &self,
        response_provider: &str,
        input: RequestInput,
    ) -> Result<PipelineResult, PipelineError> {
        let was_voice = input.is_voice();

        // Transcribing (voice input only). The guard must outlive the whole
        // request so cleanup covers later stage failures too.
        let (_upload, transcript) = match input {
            RequestInput::Audio { bytes, filename } => {
                let artifact =
                    InputArtifact::write(&self.media_dir, &bytes, filename.as_deref()).await?;
                let transcriber = self.registry.transcriber();
                let text = transcriber.transcribe(artifact.path()).await?;
                info!(
                    provider = transcriber.display_name(),
                    chars = text.len(),
                    "transcribed voice input"
                );
                (Some(artifact), text)
            }
            RequestInput::Text(text) => (None, text),
        };

        // Responding. History is built fresh per request — nothing is shared
        // or persisted across calls.
        let history = vec![
            ChatMessage::system(&self.system_prompt),
            ChatMessage::user(&transcript),
        ];

        let responder = self.registry.responder(response_provider)?;
        debug!(provider = responder.display_name(), "generating response");
        let reply = responder.respond(&history).await?;

        // Synthesizing (voice input only).
        let audio_url = if was_voice {
            let synthesizer = self.registry.synthesizer();
            let filename = output_filename(synthesizer.file_ext());
            let dest = self.media_dir.join(&filename);
            synthesizer.synthesize(&reply, &dest).await?;
            info!(
                provider = synthesizer.display_name(),
                file = %filename,
                "synthesized reply audio"
            );
            Some(format!("/static/{filename}"))
        } else {
            None
        };

        Ok(PipelineResult {
            response_text: reply,
            audio_url,
            transcribed_text: transcript,
            model_used: response_provider.to_string(),
        })
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
