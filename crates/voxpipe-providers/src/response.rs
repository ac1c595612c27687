//! Reply generation — one adapter per response backend.
//!
//! The normalized history arrives as ordered role/content pairs; each adapter
//! owns the translation into its backend's wire shape:
//!
//! - [`OpenAiCompatChat`] — `/chat/completions` takes the list verbatim
//!   (covers `openai` and `groq`)
//! - [`GeminiChat`] — leading system turn becomes `systemInstruction`,
//!   assistant turns become role `model`, everything else passes in order
//! - [`OllamaChat`] — the native `/api/chat` endpoint also takes the list
//!   verbatim, credential-free
//!
//! A single failed call fails the whole request — the pipeline is interactive
//! and cheap to re-issue, so no adapter retries.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use voxpipe_core::types::{ChatCompletionRequest, ChatCompletionResponse};
use voxpipe_core::{ChatMessage, PipelineError};

use crate::traits::Respond;

/// Request timeout for reply generation.
const RESPOND_TIMEOUT: Duration = Duration::from_secs(120);

fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(RESPOND_TIMEOUT)
        .build()
        .expect("failed to build HTTP client")
}

// ─────────────────────────────────────────────
// OpenAI-compatible chat (openai, groq)
// ─────────────────────────────────────────────

/// Chat client for any OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiCompatChat {
    display_name: String,
    api_base: String,
    api_key: String,
    model: String,
    temperature: Option<f64>,
    client: reqwest::Client,
}

impl std::fmt::Debug for OpenAiCompatChat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiCompatChat")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("provider", &self.display_name)
            .finish()
    }
}

impl OpenAiCompatChat {
    pub fn new(
        display_name: impl Into<String>,
        api_base: &str,
        api_key: impl Into<String>,
        model: impl Into<String>,
        temperature: Option<f64>,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            temperature,
            client: http_client(),
        }
    }

    /// OpenAI backend.
    pub fn openai(api_key: &str, api_base: Option<&str>, model: &str) -> Self {
        Self::new(
            "OpenAI",
            api_base.unwrap_or("https://api.openai.com/v1"),
            api_key,
            model,
            None,
        )
    }

    /// Groq backend (OpenAI-compatible API).
    pub fn groq(api_key: &str, api_base: Option<&str>, model: &str) -> Self {
        Self::new(
            "Groq",
            api_base.unwrap_or("https://api.groq.com/openai/v1"),
            api_key,
            model,
            Some(0.7),
        )
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.api_base)
    }
}

#[async_trait]
impl Respond for OpenAiCompatChat {
    async fn respond(&self, history: &[ChatMessage]) -> Result<String, PipelineError> {
        let run = async {
            debug!(
                provider = %self.display_name,
                model = %self.model,
                messages = history.len(),
                "generating response"
            );

            let request = ChatCompletionRequest {
                model: self.model.clone(),
                messages: history.to_vec(),
                temperature: self.temperature,
            };

            let response = self
                .client
                .post(self.completions_url())
                .bearer_auth(&self.api_key)
                .json(&request)
                .send()
                .await
                .context("chat completion request failed")?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                anyhow::bail!("chat API returned {status}: {body}");
            }

            let parsed: ChatCompletionResponse = response
                .json()
                .await
                .context("parsing chat completion response")?;

            parsed
                .into_text()
                .context("chat completion response had no content")
        };

        run.await.map_err(PipelineError::ResponseGenerationFailed)
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }
}

// ─────────────────────────────────────────────
// Gemini
// ─────────────────────────────────────────────

/// Gemini wire shapes (`v1beta` `generateContent`).
///
/// No flat role/content list here: the system turn travels in a dedicated
/// `systemInstruction` field and assistant turns carry role `model`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    contents: Vec<GeminiContent>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: GeminiContent,
}

/// Gemini chat client.
pub struct GeminiChat {
    api_base: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for GeminiChat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiChat")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .finish()
    }
}

impl GeminiChat {
    pub fn new(api_key: impl Into<String>, api_base: Option<&str>, model: impl Into<String>) -> Self {
        Self {
            api_base: api_base
                .unwrap_or("https://generativelanguage.googleapis.com")
                .trim_end_matches('/')
                .to_string(),
            api_key: api_key.into(),
            model: model.into(),
            client: http_client(),
        }
    }

    fn generate_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_base, self.model
        )
    }

    /// Translate the normalized history into the Gemini request shape.
    ///
    /// The leading system message (if any) is extracted into
    /// `systemInstruction`; every remaining turn maps role-for-role into
    /// `contents` with `assistant` renamed to `model`, the live user turn
    /// last. Total over any history length.
    fn translate(history: &[ChatMessage]) -> GenerateContentRequest {
        let (system, turns) = match history.first() {
            Some(ChatMessage::System { content }) => (
                Some(GeminiContent {
                    role: None,
                    parts: vec![GeminiPart {
                        text: content.clone(),
                    }],
                }),
                &history[1..],
            ),
            _ => (None, history),
        };

        let contents = turns
            .iter()
            .map(|msg| GeminiContent {
                role: Some(
                    match msg {
                        ChatMessage::Assistant { .. } => "model",
                        _ => "user",
                    }
                    .to_string(),
                ),
                parts: vec![GeminiPart {
                    text: msg.content().to_string(),
                }],
            })
            .collect();

        GenerateContentRequest {
            system_instruction: system,
            contents,
        }
    }
}

#[async_trait]
impl Respond for GeminiChat {
    async fn respond(&self, history: &[ChatMessage]) -> Result<String, PipelineError> {
        let run = async {
            debug!(model = %self.model, messages = history.len(), "generating response via Gemini");

            let request = Self::translate(history);

            let response = self
                .client
                .post(self.generate_url())
                .header("x-goog-api-key", &self.api_key)
                .json(&request)
                .send()
                .await
                .context("generateContent request failed")?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                anyhow::bail!("Gemini API returned {status}: {body}");
            }

            let parsed: GenerateContentResponse = response
                .json()
                .await
                .context("parsing generateContent response")?;

            let text: String = parsed
                .candidates
                .into_iter()
                .next()
                .context("Gemini response had no candidates")?
                .content
                .parts
                .into_iter()
                .map(|p| p.text)
                .collect();

            Ok(text)
        };

        run.await.map_err(PipelineError::ResponseGenerationFailed)
    }

    fn display_name(&self) -> &str {
        "Gemini"
    }
}

// ─────────────────────────────────────────────
// Ollama
// ─────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct OllamaChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    message: OllamaMessage,
}

#[derive(Debug, Deserialize)]
struct OllamaMessage {
    content: String,
}

/// Local Ollama chat client — no credential, native `/api/chat` endpoint.
#[derive(Debug)]
pub struct OllamaChat {
    api_base: String,
    model: String,
    client: reqwest::Client,
}

impl OllamaChat {
    pub fn new(api_base: Option<&str>, model: impl Into<String>) -> Self {
        Self {
            api_base: api_base
                .unwrap_or("http://127.0.0.1:11434")
                .trim_end_matches('/')
                .to_string(),
            model: model.into(),
            client: http_client(),
        }
    }
}

#[async_trait]
impl Respond for OllamaChat {
    async fn respond(&self, history: &[ChatMessage]) -> Result<String, PipelineError> {
        let run = async {
            debug!(model = %self.model, messages = history.len(), "generating response via Ollama");

            let request = OllamaChatRequest {
                model: self.model.clone(),
                messages: history.to_vec(),
                stream: false,
            };

            let response = self
                .client
                .post(format!("{}/api/chat", self.api_base))
                .json(&request)
                .send()
                .await
                .context("ollama chat request failed")?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                anyhow::bail!("ollama returned {status}: {body}");
            }

            let parsed: OllamaChatResponse =
                response.json().await.context("parsing ollama response")?;
            Ok(parsed.message.content)
        };

        run.await.map_err(PipelineError::ResponseGenerationFailed)
    }

    fn display_name(&self) -> &str {
        "Ollama"
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

    fn history() -> Vec<ChatMessage> {
        vec![
            ChatMessage::system("You are a voice assistant."),
            ChatMessage::user("What's the weather?"),
        ]
    }

    // ── OpenAI-compatible ──

    #[tokio::test]
    async fn test_openai_compat_passes_history_verbatim() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer sk-test"))
            .and(body_partial_json(serde_json::json!({
                "model": "gpt-4o",
                "messages": [
                    { "role": "system", "content": "You are a voice assistant." },
                    { "role": "user", "content": "What's the weather?" }
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{ "message": { "role": "assistant", "content": "Sunny." } }]
            })))
            .mount(&mock_server)
            .await;

        let chat = OpenAiCompatChat::openai("sk-test", Some(&mock_server.uri()), "gpt-4o");
        let reply = chat.respond(&history()).await.unwrap();
        assert_eq!(reply, "Sunny.");
    }

    #[tokio::test]
    async fn test_groq_sets_temperature() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(serde_json::json!({
                "model": "llama3-8b-8192",
                "temperature": 0.7
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{ "message": { "role": "assistant", "content": "ok" } }]
            })))
            .mount(&mock_server)
            .await;

        let chat = OpenAiCompatChat::groq("gsk-test", Some(&mock_server.uri()), "llama3-8b-8192");
        let reply = chat.respond(&history()).await.unwrap();
        assert_eq!(reply, "ok");
    }

    #[tokio::test]
    async fn test_openai_compat_api_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .mount(&mock_server)
            .await;

        let chat = OpenAiCompatChat::openai("sk-test", Some(&mock_server.uri()), "gpt-4o");
        let err = chat.respond(&history()).await.unwrap_err();
        assert!(matches!(err, PipelineError::ResponseGenerationFailed(_)));
    }

    #[tokio::test]
    async fn test_openai_compat_network_error() {
        let chat = OpenAiCompatChat::openai("sk-test", Some("http://127.0.0.1:1"), "gpt-4o");
        let err = chat.respond(&history()).await.unwrap_err();
        assert!(matches!(err, PipelineError::ResponseGenerationFailed(_)));
    }

    #[test]
    fn test_debug_hides_api_key() {
        let chat = OpenAiCompatChat::openai("sk-very-secret", None, "gpt-4o");
        assert!(!format!("{chat:?}").contains("sk-very-secret"));
        let gemini = GeminiChat::new("AIza-secret", None, "gemini-1.5-flash-latest");
        assert!(!format!("{gemini:?}").contains("AIza-secret"));
    }

    // ── Gemini ──

    #[test]
    fn test_gemini_translation_extracts_system_instruction() {
        let request = GeminiChat::translate(&history());

        let system = request.system_instruction.unwrap();
        assert!(system.role.is_none());
        assert_eq!(system.parts[0].text, "You are a voice assistant.");

        assert_eq!(request.contents.len(), 1);
        assert_eq!(request.contents[0].role.as_deref(), Some("user"));
        assert_eq!(request.contents[0].parts[0].text, "What's the weather?");
    }

    #[test]
    fn test_gemini_translation_maps_assistant_to_model() {
        let history = vec![
            ChatMessage::system("persona"),
            ChatMessage::user("first question"),
            ChatMessage::assistant("first answer"),
            ChatMessage::user("second question"),
        ];

        let request = GeminiChat::translate(&history);

        let roles: Vec<_> = request
            .contents
            .iter()
            .map(|c| c.role.as_deref().unwrap())
            .collect();
        assert_eq!(roles, ["user", "model", "user"]);
        assert_eq!(request.contents[2].parts[0].text, "second question");
    }

    #[test]
    fn test_gemini_translation_without_system_turn() {
        let history = vec![ChatMessage::user("hi")];
        let request = GeminiChat::translate(&history);
        assert!(request.system_instruction.is_none());
        assert_eq!(request.contents.len(), 1);
    }

    #[tokio::test]
    async fn test_gemini_respond() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-1.5-flash-latest:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .and(body_partial_json(serde_json::json!({
                "systemInstruction": { "parts": [{ "text": "You are a voice assistant." }] },
                "contents": [
                    { "role": "user", "parts": [{ "text": "What's the weather?" }] }
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{
                    "content": { "role": "model", "parts": [{ "text": "Cloudy." }] }
                }]
            })))
            .mount(&mock_server)
            .await;

        let chat = GeminiChat::new("test-key", Some(&mock_server.uri()), "gemini-1.5-flash-latest");
        let reply = chat.respond(&history()).await.unwrap();
        assert_eq!(reply, "Cloudy.");
    }

    #[tokio::test]
    async fn test_gemini_no_candidates_is_an_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "candidates": [] })),
            )
            .mount(&mock_server)
            .await;

        let chat = GeminiChat::new("test-key", Some(&mock_server.uri()), "gemini-1.5-flash-latest");
        let err = chat.respond(&history()).await.unwrap_err();
        assert!(matches!(err, PipelineError::ResponseGenerationFailed(_)));
    }

    // ── Ollama ──

    #[tokio::test]
    async fn test_ollama_passes_history_verbatim_without_auth() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(body_partial_json(serde_json::json!({
                "model": "llama3.2",
                "stream": false,
                "messages": [
                    { "role": "system", "content": "You are a voice assistant." },
                    { "role": "user", "content": "What's the weather?" }
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "message": { "role": "assistant", "content": "Rainy." },
                "done": true
            })))
            .mount(&mock_server)
            .await;

        let chat = OllamaChat::new(Some(&mock_server.uri()), "llama3.2");
        let reply = chat.respond(&history()).await.unwrap();
        assert_eq!(reply, "Rainy.");
    }

    #[tokio::test]
    async fn test_ollama_unreachable() {
        let chat = OllamaChat::new(Some("http://127.0.0.1:1"), "llama3.2");
        let err = chat.respond(&history()).await.unwrap_err();
        assert!(matches!(err, PipelineError::ResponseGenerationFailed(_)));
    }
}
