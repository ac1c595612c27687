//! Configuration schema — the declarative surface resolved once at startup.
//!
//! Hierarchy: `Config` → `ServerConfig`, `PipelineConfig`, `ProvidersConfig`.
//! JSON on disk uses **camelCase** keys; Rust uses snake_case, converted with
//! `#[serde(rename_all = "camelCase")]`.
//!
//! Changing any of this requires a restart — nothing here is re-read during
//! request handling.

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────
// Root Config
// ─────────────────────────────────────────────

/// Root configuration — loaded from `~/.voxpipe/config.json` + env vars.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub server: ServerConfig,
    pub pipeline: PipelineConfig,
    pub providers: ProvidersConfig,
}

// ─────────────────────────────────────────────
// Server
// ─────────────────────────────────────────────

/// HTTP server settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory for transient uploads and generated speech, served at `/static`.
    pub media_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            media_dir: "generated_audio".to_string(),
        }
    }
}

// ─────────────────────────────────────────────
// Pipeline selections
// ─────────────────────────────────────────────

/// Which provider/model serves each pipeline stage.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PipelineConfig {
    /// Persona prompt placed as the system turn of every request.
    pub system_prompt: String,
    pub transcription: TranscriptionSelection,
    pub response: ResponseConfig,
    pub synthesis: SynthesisSelection,
    /// Endpoint of the local synthesis service (the `melotts` backend).
    pub local_tts_url: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            system_prompt: "You are Voxpipe, a friendly and helpful voice assistant.".to_string(),
            transcription: TranscriptionSelection::default(),
            response: ResponseConfig::default(),
            synthesis: SynthesisSelection::default(),
            local_tts_url: "http://127.0.0.1:8001/api/tts".to_string(),
        }
    }
}

/// Active transcription backend. `model: None` uses the provider's default.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TranscriptionSelection {
    pub provider: String,
    pub model: Option<String>,
}

impl Default for TranscriptionSelection {
    fn default() -> Self {
        Self {
            provider: "groq".to_string(),
            model: None,
        }
    }
}

/// Active synthesis backend. `voice: None` uses the provider's default voice.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SynthesisSelection {
    pub provider: String,
    pub model: Option<String>,
    pub voice: Option<String>,
}

impl Default for SynthesisSelection {
    fn default() -> Self {
        Self {
            provider: "melotts".to_string(),
            model: None,
            voice: None,
        }
    }
}

/// Response stage configuration.
///
/// The provider is caller-supplied per request; `default_provider` only names
/// which one status reporting treats as active. `models` pins the exact model
/// id used when a given provider is requested.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResponseConfig {
    pub default_provider: String,
    pub models: ResponseModels,
}

impl Default for ResponseConfig {
    fn default() -> Self {
        Self {
            default_provider: "ollama".to_string(),
            models: ResponseModels::default(),
        }
    }
}

/// Exact model id per response provider.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResponseModels {
    pub openai: String,
    pub groq: String,
    pub gemini: String,
    pub ollama: String,
}

impl Default for ResponseModels {
    fn default() -> Self {
        Self {
            openai: "gpt-4o".to_string(),
            groq: "llama3-8b-8192".to_string(),
            gemini: "gemini-1.5-flash-latest".to_string(),
            ollama: "llama3.2".to_string(),
        }
    }
}

impl ResponseModels {
    /// Model id for a provider name, `None` if the name is unknown.
    pub fn model_for(&self, provider: &str) -> Option<&str> {
        match provider {
            "openai" => Some(&self.openai),
            "groq" => Some(&self.groq),
            "gemini" => Some(&self.gemini),
            "ollama" => Some(&self.ollama),
            _ => None,
        }
    }
}

// ─────────────────────────────────────────────
// Provider credentials
// ─────────────────────────────────────────────

/// Connection settings for a single provider (API key, base URL).
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProviderConfig {
    /// API key for authentication. Empty means "no credential".
    #[serde(default)]
    pub api_key: String,
    /// Custom API base URL (overrides the provider default).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
}

impl ProviderConfig {
    /// Whether this provider has a configured API key.
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }
}

// Credentials must never leak through Debug output.
impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &if self.is_configured() { "***" } else { "" })
            .field("api_base", &self.api_base)
            .finish()
    }
}

/// All provider connection settings.
///
/// The same entry serves every capability a provider participates in —
/// e.g. `openai` covers transcription, response, and synthesis with one key.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub openai: ProviderConfig,
    #[serde(default)]
    pub groq: ProviderConfig,
    #[serde(default)]
    pub gemini: ProviderConfig,
    #[serde(default)]
    pub elevenlabs: ProviderConfig,
    /// Local model runner — credential-free, only the base URL matters.
    #[serde(default)]
    pub ollama: ProviderConfig,
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.pipeline.transcription.provider, "groq");
        assert_eq!(config.pipeline.synthesis.provider, "melotts");
        assert_eq!(config.pipeline.response.default_provider, "ollama");
        assert!(config.pipeline.system_prompt.contains("voice assistant"));
    }

    #[test]
    fn test_model_for_known_providers() {
        let models = ResponseModels::default();
        assert_eq!(models.model_for("openai"), Some("gpt-4o"));
        assert_eq!(models.model_for("groq"), Some("llama3-8b-8192"));
        assert_eq!(models.model_for("gemini"), Some("gemini-1.5-flash-latest"));
        assert_eq!(models.model_for("ollama"), Some("llama3.2"));
        assert_eq!(models.model_for("mystery"), None);
    }

    #[test]
    fn test_camel_case_keys() {
        let raw = r#"{
            "server": { "mediaDir": "/tmp/media" },
            "pipeline": {
                "systemPrompt": "Be terse.",
                "response": { "defaultProvider": "groq" },
                "localTtsUrl": "http://10.0.0.5:8001/api/tts"
            }
        }"#;

        let config: Config = serde_json::from_str(raw).unwrap();
        assert_eq!(config.server.media_dir, "/tmp/media");
        assert_eq!(config.pipeline.system_prompt, "Be terse.");
        assert_eq!(config.pipeline.response.default_provider, "groq");
        assert_eq!(config.pipeline.local_tts_url, "http://10.0.0.5:8001/api/tts");
        // Untouched sections keep their defaults.
        assert_eq!(config.server.port, 8000);
    }

    #[test]
    fn test_provider_config_is_configured() {
        let mut provider = ProviderConfig::default();
        assert!(!provider.is_configured());
        provider.api_key = "sk-123".to_string();
        assert!(provider.is_configured());
    }

    #[test]
    fn test_debug_hides_api_key() {
        let provider = ProviderConfig {
            api_key: "sk-very-secret".to_string(),
            api_base: None,
        };
        let rendered = format!("{provider:?}");
        assert!(!rendered.contains("sk-very-secret"));
    }
}
