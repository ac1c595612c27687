//! Speech-to-text over OpenAI-compatible `audio/transcriptions` endpoints.
//!
//! One client covers every backend that speaks this multipart protocol —
//! currently `openai` (whisper-1) and `groq` (whisper-large-v3); any
//! compatible endpoint works via a custom base URL.

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use tracing::debug;

use voxpipe_core::PipelineError;

use crate::traits::Transcribe;

/// Request timeout for transcription calls.
const TRANSCRIBE_TIMEOUT: Duration = Duration::from_secs(60);

/// OpenAI-compatible speech-to-text client.
pub struct WhisperHttp {
    display_name: String,
    api_url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for WhisperHttp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WhisperHttp")
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("provider", &self.display_name)
            .finish()
    }
}

impl WhisperHttp {
    /// Create a transcriber for any OpenAI-compatible endpoint.
    ///
    /// `api_base` is the versioned root (e.g. `https://api.openai.com/v1`);
    /// the `audio/transcriptions` path is appended here.
    pub fn new(
        display_name: impl Into<String>,
        api_base: &str,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        let base = api_base.trim_end_matches('/');
        Self {
            display_name: display_name.into(),
            api_url: format!("{base}/audio/transcriptions"),
            api_key: api_key.into(),
            model: model.into(),
            client: reqwest::Client::builder()
                .timeout(TRANSCRIBE_TIMEOUT)
                .build()
                .expect("failed to build HTTP client"),
        }
    }

    /// OpenAI Whisper backend.
    pub fn openai(api_key: &str, api_base: Option<&str>, model: Option<&str>) -> Self {
        Self::new(
            "OpenAI Whisper",
            api_base.unwrap_or("https://api.openai.com/v1"),
            api_key,
            model.unwrap_or("whisper-1"),
        )
    }

    /// Groq Whisper backend.
    pub fn groq(api_key: &str, api_base: Option<&str>, model: Option<&str>) -> Self {
        Self::new(
            "Groq Whisper",
            api_base.unwrap_or("https://api.groq.com/openai/v1"),
            api_key,
            model.unwrap_or("whisper-large-v3"),
        )
    }
}

#[async_trait]
impl Transcribe for WhisperHttp {
    async fn transcribe(&self, audio: &Path) -> Result<String, PipelineError> {
        let run = async {
            let file_name = audio
                .file_name()
                .unwrap_or_default()
                .to_string_lossy()
                .to_string();

            let file_bytes = tokio::fs::read(audio)
                .await
                .with_context(|| format!("reading audio artifact {}", audio.display()))?;

            debug!(
                provider = %self.display_name,
                model = %self.model,
                bytes = file_bytes.len(),
                "transcribing audio"
            );

            let file_part = reqwest::multipart::Part::bytes(file_bytes)
                .file_name(file_name)
                .mime_str("application/octet-stream")
                .context("building multipart file part")?;

            let form = reqwest::multipart::Form::new()
                .part("file", file_part)
                .text("model", self.model.clone());

            let response = self
                .client
                .post(&self.api_url)
                .bearer_auth(&self.api_key)
                .multipart(form)
                .send()
                .await
                .context("transcription request failed")?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                anyhow::bail!("transcription API returned {status}: {body}");
            }

            let json: serde_json::Value = response
                .json()
                .await
                .context("parsing transcription response")?;
            let text = json["text"].as_str().unwrap_or_default().to_string();

            debug!(provider = %self.display_name, chars = text.len(), "transcription complete");
            Ok(text)
        };

        run.await.map_err(PipelineError::TranscriptionFailed)
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn temp_audio(bytes: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".wav").tempfile().unwrap();
        file.write_all(bytes).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_url_construction() {
        let t = WhisperHttp::new("Test", "https://stt.example/v1/", "key", "whisper-1");
        assert_eq!(t.api_url, "https://stt.example/v1/audio/transcriptions");
    }

    #[test]
    fn test_provider_defaults() {
        let openai = WhisperHttp::openai("key", None, None);
        assert_eq!(openai.model, "whisper-1");
        assert!(openai.api_url.starts_with("https://api.openai.com/v1"));

        let groq = WhisperHttp::groq("key", None, Some("whisper-large-v3-turbo"));
        assert_eq!(groq.model, "whisper-large-v3-turbo");
        assert!(groq.api_url.starts_with("https://api.groq.com/openai/v1"));
    }

    #[test]
    fn test_debug_hides_api_key() {
        let t = WhisperHttp::openai("sk-very-secret", None, None);
        assert!(!format!("{t:?}").contains("sk-very-secret"));
    }

    #[tokio::test]
    async fn test_transcribe_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/audio/transcriptions"))
            .and(header("Authorization", "Bearer test-key-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "text": "turn on the lights"
            })))
            .mount(&mock_server)
            .await;

        let file = temp_audio(b"RIFF....WAVE");
        let t = WhisperHttp::new("Test", &mock_server.uri(), "test-key-123", "whisper-1");

        let text = t.transcribe(file.path()).await.unwrap();
        assert_eq!(text, "turn on the lights");
    }

    #[tokio::test]
    async fn test_transcribe_api_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/audio/transcriptions"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
            .mount(&mock_server)
            .await;

        let file = temp_audio(b"RIFF....WAVE");
        let t = WhisperHttp::new("Test", &mock_server.uri(), "bad-key", "whisper-1");

        let err = t.transcribe(file.path()).await.unwrap_err();
        assert!(matches!(err, PipelineError::TranscriptionFailed(_)));
    }

    #[tokio::test]
    async fn test_transcribe_missing_file_is_an_error() {
        let t = WhisperHttp::new("Test", "http://127.0.0.1:1", "key", "whisper-1");
        let err = t
            .transcribe(Path::new("/nonexistent/audio.wav"))
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::TranscriptionFailed(_)));
    }
}
