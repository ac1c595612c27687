//! Core types for Voxpipe — the normalized chat contract and pipeline payloads.
//!
//! Every response provider receives the same role/content message sequence;
//! the adapters in `voxpipe-providers` translate it into each backend's wire
//! shape. Using a role-tagged enum catches format errors at compile time
//! instead of at the provider boundary.

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────
// Capabilities and selections
// ─────────────────────────────────────────────

/// A pipeline stage backed by interchangeable providers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Capability {
    Transcription,
    Response,
    Synthesis,
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Capability::Transcription => "transcription",
            Capability::Response => "response",
            Capability::Synthesis => "synthesis",
        };
        f.write_str(name)
    }
}

/// The provider and model active for one capability.
///
/// Transcription and synthesis selections are fixed process-wide at startup;
/// the response selection is only a default — callers name the response
/// provider per request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderSelection {
    pub capability: Capability,
    pub provider: String,
    pub model: String,
}

impl ProviderSelection {
    pub fn new(
        capability: Capability,
        provider: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            capability,
            provider: provider.into(),
            model: model.into(),
        }
    }
}

// ─────────────────────────────────────────────
// Chat messages (normalized history)
// ─────────────────────────────────────────────

/// A chat message in the normalized role/content shape.
///
/// Serializes to the OpenAI chat format (`{"role": ..., "content": ...}`),
/// which openai/groq/ollama accept verbatim; the Gemini adapter re-maps it.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum ChatMessage {
    System { content: String },
    User { content: String },
    Assistant { content: String },
}

impl ChatMessage {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        ChatMessage::System {
            content: content.into(),
        }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        ChatMessage::User {
            content: content.into(),
        }
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        ChatMessage::Assistant {
            content: content.into(),
        }
    }

    /// The role name as it appears on the wire.
    pub fn role(&self) -> &'static str {
        match self {
            ChatMessage::System { .. } => "system",
            ChatMessage::User { .. } => "user",
            ChatMessage::Assistant { .. } => "assistant",
        }
    }

    /// The text content.
    pub fn content(&self) -> &str {
        match self {
            ChatMessage::System { content }
            | ChatMessage::User { content }
            | ChatMessage::Assistant { content } => content,
        }
    }
}

/// Ordered message sequence, first element conventionally the system persona.
///
/// Built fresh per request — never persisted, never shared across requests.
pub type ChatHistory = Vec<ChatMessage>;

// ─────────────────────────────────────────────
// Pipeline input / output
// ─────────────────────────────────────────────

/// What the caller submitted — exactly one of typed text or recorded audio.
///
/// The HTTP boundary rejects requests with neither or both before this enum
/// is ever constructed.
#[derive(Clone, Debug)]
pub enum RequestInput {
    Text(String),
    Audio {
        bytes: Vec<u8>,
        /// Original upload filename, used only to keep a recognizable
        /// audio extension on the transient artifact.
        filename: Option<String>,
    },
}

impl RequestInput {
    /// Whether the input was spoken (drives conditional synthesis).
    pub fn is_voice(&self) -> bool {
        matches!(self, RequestInput::Audio { .. })
    }
}

/// The assembled result of one pipeline run.
///
/// `audio_url` is present if and only if the originating input was audio.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PipelineResult {
    /// Generated reply text.
    pub response_text: String,
    /// Retrieval path for the synthesized reply, e.g. `/static/response_<id>.wav`.
    pub audio_url: Option<String>,
    /// The transcript for voice input, or the submitted text verbatim.
    pub transcribed_text: String,
    /// The response provider that served this request.
    pub model_used: String,
}

// ─────────────────────────────────────────────
// OpenAI-compatible chat wire shapes
// ─────────────────────────────────────────────

/// Request body for an OpenAI-compatible `/chat/completions` endpoint.
#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

/// Raw chat completion response from an OpenAI-compatible API.
#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Vec<ChatChoice>,
}

/// A single choice in a chat completion response.
#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: AssistantReply,
}

/// The assistant message within a chat completion choice.
#[derive(Debug, Deserialize)]
pub struct AssistantReply {
    pub content: Option<String>,
}

impl ChatCompletionResponse {
    /// Extract the first choice's text content, if any.
    pub fn into_text(self) -> Option<String> {
        self.choices.into_iter().next().and_then(|c| c.message.content)
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
