//! Text-to-speech — one adapter per synthesis backend.
//!
//! Three backend shapes:
//!
//! - [`OpenAiSpeech`] — returns a complete audio payload, written in one shot
//! - [`ElevenLabsSpeech`] — returns a chunked stream, written incrementally
//! - [`LocalSpeech`] — the local synthesis service over HTTP; failures here
//!   surface as [`PipelineError::LocalServiceUnavailable`] so a dead local
//!   process is distinguishable from an upstream quota/key problem
//!
//! Every adapter creates exactly one artifact at the destination the caller
//! supplies; destination uniqueness is the caller's guarantee.

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use futures_util::StreamExt;
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use voxpipe_core::PipelineError;

use crate::traits::Synthesize;

/// Request timeout for synthesis calls.
const SYNTHESIZE_TIMEOUT: Duration = Duration::from_secs(120);

fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(SYNTHESIZE_TIMEOUT)
        .build()
        .expect("failed to build HTTP client")
}

/// Write a chunked response body to `dest` incrementally.
async fn write_stream(response: reqwest::Response, dest: &Path) -> anyhow::Result<()> {
    let mut file = tokio::fs::File::create(dest)
        .await
        .with_context(|| format!("creating audio artifact {}", dest.display()))?;

    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.context("reading audio stream")?;
        file.write_all(&chunk).await.context("writing audio chunk")?;
    }
    file.flush().await.context("flushing audio artifact")?;
    Ok(())
}

// ─────────────────────────────────────────────
// OpenAI speech
// ─────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct OpenAiSpeechRequest {
    model: String,
    voice: String,
    input: String,
}

/// OpenAI `audio/speech` backend — one-shot payload.
pub struct OpenAiSpeech {
    api_base: String,
    api_key: String,
    model: String,
    voice: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for OpenAiSpeech {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiSpeech")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("voice", &self.voice)
            .finish()
    }
}

impl OpenAiSpeech {
    pub fn new(
        api_key: &str,
        api_base: Option<&str>,
        model: Option<&str>,
        voice: Option<&str>,
    ) -> Self {
        Self {
            api_base: api_base
                .unwrap_or("https://api.openai.com/v1")
                .trim_end_matches('/')
                .to_string(),
            api_key: api_key.to_string(),
            model: model.unwrap_or("tts-1").to_string(),
            voice: voice.unwrap_or("nova").to_string(),
            client: http_client(),
        }
    }
}

#[async_trait]
impl Synthesize for OpenAiSpeech {
    async fn synthesize(&self, text: &str, dest: &Path) -> Result<(), PipelineError> {
        let run = async {
            debug!(model = %self.model, voice = %self.voice, chars = text.len(), "synthesizing via OpenAI");

            let request = OpenAiSpeechRequest {
                model: self.model.clone(),
                voice: self.voice.clone(),
                input: text.to_string(),
            };

            let response = self
                .client
                .post(format!("{}/audio/speech", self.api_base))
                .bearer_auth(&self.api_key)
                .json(&request)
                .send()
                .await
                .context("speech request failed")?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                anyhow::bail!("speech API returned {status}: {body}");
            }

            let audio = response.bytes().await.context("reading audio payload")?;
            tokio::fs::write(dest, &audio)
                .await
                .with_context(|| format!("writing audio artifact {}", dest.display()))?;
            Ok(())
        };

        run.await.map_err(PipelineError::SynthesisFailed)
    }

    fn display_name(&self) -> &str {
        "OpenAI Speech"
    }

    fn file_ext(&self) -> &'static str {
        "mp3"
    }
}

// ─────────────────────────────────────────────
// ElevenLabs
// ─────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ElevenLabsRequest {
    text: String,
    model_id: String,
}

/// ElevenLabs text-to-speech backend — chunked stream.
pub struct ElevenLabsSpeech {
    api_base: String,
    api_key: String,
    model_id: String,
    voice_id: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for ElevenLabsSpeech {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElevenLabsSpeech")
            .field("api_base", &self.api_base)
            .field("model_id", &self.model_id)
            .field("voice_id", &self.voice_id)
            .finish()
    }
}

impl ElevenLabsSpeech {
    pub fn new(
        api_key: &str,
        api_base: Option<&str>,
        model_id: Option<&str>,
        voice_id: Option<&str>,
    ) -> Self {
        Self {
            api_base: api_base
                .unwrap_or("https://api.elevenlabs.io")
                .trim_end_matches('/')
                .to_string(),
            api_key: api_key.to_string(),
            model_id: model_id.unwrap_or("eleven_multilingual_v2").to_string(),
            voice_id: voice_id.unwrap_or("pNInz6obpgDQGcFmaJgB").to_string(),
            client: http_client(),
        }
    }
}

#[async_trait]
impl Synthesize for ElevenLabsSpeech {
    async fn synthesize(&self, text: &str, dest: &Path) -> Result<(), PipelineError> {
        let run = async {
            debug!(model = %self.model_id, voice = %self.voice_id, chars = text.len(), "synthesizing via ElevenLabs");

            let request = ElevenLabsRequest {
                text: text.to_string(),
                model_id: self.model_id.clone(),
            };

            let response = self
                .client
                .post(format!(
                    "{}/v1/text-to-speech/{}",
                    self.api_base, self.voice_id
                ))
                .header("xi-api-key", &self.api_key)
                .json(&request)
                .send()
                .await
                .context("text-to-speech request failed")?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                anyhow::bail!("text-to-speech API returned {status}: {body}");
            }

            write_stream(response, dest).await
        };

        run.await.map_err(PipelineError::SynthesisFailed)
    }

    fn display_name(&self) -> &str {
        "ElevenLabs"
    }

    fn file_ext(&self) -> &'static str {
        "mp3"
    }
}

// ─────────────────────────────────────────────
// Local synthesis service
// ─────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct LocalSpeechRequest {
    text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    speaker_id: Option<String>,
}

/// The local synthesis service, consumed as just another backend.
///
/// Credential-free; every failure maps to `LocalServiceUnavailable` because
/// the remedy is operational (start or fix the local process), unlike the
/// cloud backends.
#[derive(Debug)]
pub struct LocalSpeech {
    url: String,
    speaker: Option<String>,
    client: reqwest::Client,
}

impl LocalSpeech {
    pub fn new(url: impl Into<String>, speaker: Option<String>) -> Self {
        Self {
            url: url.into(),
            speaker,
            client: http_client(),
        }
    }
}

#[async_trait]
impl Synthesize for LocalSpeech {
    async fn synthesize(&self, text: &str, dest: &Path) -> Result<(), PipelineError> {
        let run = async {
            debug!(url = %self.url, chars = text.len(), "synthesizing via local service");

            let request = LocalSpeechRequest {
                text: text.to_string(),
                speaker_id: self.speaker.clone(),
            };

            let response = self
                .client
                .post(&self.url)
                .json(&request)
                .send()
                .await
                .context("local synthesis service unreachable")?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                anyhow::bail!("local synthesis service returned {status}: {body}");
            }

            write_stream(response, dest).await
        };

        run.await.map_err(PipelineError::LocalServiceUnavailable)
    }

    fn display_name(&self) -> &str {
        "Local TTS"
    }

    fn file_ext(&self) -> &'static str {
        "wav"
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn dest_in(dir: &tempfile::TempDir, name: &str) -> std::path::PathBuf {
        dir.path().join(name)
    }

    #[tokio::test]
    async fn test_openai_speech_writes_payload() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/audio/speech"))
            .and(header("Authorization", "Bearer sk-test"))
            .and(body_partial_json(serde_json::json!({
                "model": "tts-1",
                "voice": "nova",
                "input": "hello world"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"ID3fake-mp3".to_vec()))
            .mount(&mock_server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dest_in(&dir, "reply.mp3");

        let tts = OpenAiSpeech::new("sk-test", Some(&mock_server.uri()), None, None);
        tts.synthesize("hello world", &dest).await.unwrap();

        assert_eq!(std::fs::read(&dest).unwrap(), b"ID3fake-mp3");
        assert_eq!(tts.file_ext(), "mp3");
    }

    #[tokio::test]
    async fn test_openai_speech_api_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/audio/speech"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
            .mount(&mock_server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dest_in(&dir, "reply.mp3");

        let tts = OpenAiSpeech::new("sk-bad", Some(&mock_server.uri()), None, None);
        let err = tts.synthesize("hello", &dest).await.unwrap_err();

        assert!(matches!(err, PipelineError::SynthesisFailed(_)));
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn test_elevenlabs_streams_to_file() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/text-to-speech/pNInz6obpgDQGcFmaJgB"))
            .and(header("xi-api-key", "el-test"))
            .and(body_partial_json(serde_json::json!({
                "text": "hello world",
                "model_id": "eleven_multilingual_v2"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; 32 * 1024]))
            .mount(&mock_server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dest_in(&dir, "reply.mp3");

        let tts = ElevenLabsSpeech::new("el-test", Some(&mock_server.uri()), None, None);
        tts.synthesize("hello world", &dest).await.unwrap();

        assert_eq!(std::fs::metadata(&dest).unwrap().len(), 32 * 1024);
    }

    #[tokio::test]
    async fn test_elevenlabs_api_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(402).set_body_string("quota exceeded"))
            .mount(&mock_server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dest_in(&dir, "reply.mp3");

        let tts = ElevenLabsSpeech::new("el-test", Some(&mock_server.uri()), None, None);
        let err = tts.synthesize("hello", &dest).await.unwrap_err();

        assert!(matches!(err, PipelineError::SynthesisFailed(_)));
    }

    #[tokio::test]
    async fn test_local_speech_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/tts"))
            .and(body_partial_json(serde_json::json!({ "text": "hello" })))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"RIFFfake-wav".to_vec()))
            .mount(&mock_server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dest_in(&dir, "reply.wav");

        let tts = LocalSpeech::new(format!("{}/api/tts", mock_server.uri()), None);
        tts.synthesize("hello", &dest).await.unwrap();

        assert_eq!(std::fs::read(&dest).unwrap(), b"RIFFfake-wav");
        assert_eq!(tts.file_ext(), "wav");
    }

    #[tokio::test]
    async fn test_local_speech_sends_configured_speaker() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/tts"))
            .and(body_partial_json(serde_json::json!({
                "text": "hello",
                "speaker_id": "EN-AU"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"RIFF".to_vec()))
            .mount(&mock_server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dest_in(&dir, "reply.wav");

        let tts = LocalSpeech::new(
            format!("{}/api/tts", mock_server.uri()),
            Some("EN-AU".to_string()),
        );
        tts.synthesize("hello", &dest).await.unwrap();
    }

    #[tokio::test]
    async fn test_local_speech_error_status_maps_to_unavailable() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("Failed to generate audio"))
            .mount(&mock_server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dest_in(&dir, "reply.wav");

        let tts = LocalSpeech::new(format!("{}/api/tts", mock_server.uri()), None);
        let err = tts.synthesize("hello", &dest).await.unwrap_err();

        assert!(matches!(err, PipelineError::LocalServiceUnavailable(_)));
    }

    #[tokio::test]
    async fn test_local_speech_unreachable_maps_to_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dest_in(&dir, "reply.wav");

        let tts = LocalSpeech::new("http://127.0.0.1:1/api/tts", None);
        let err = tts.synthesize("hello", &dest).await.unwrap_err();

        assert!(matches!(err, PipelineError::LocalServiceUnavailable(_)));
    }
}
