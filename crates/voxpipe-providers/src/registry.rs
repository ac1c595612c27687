//! Provider registry — the closed (capability × provider) set, resolved once
//! at startup.
//!
//! Configuration names providers as strings; this module turns those names
//! into constructed adapters exactly once, failing fast on anything outside
//! the known set. After construction, lookups are pure: no I/O, no parsing,
//! no runtime branching on provider quirks.
//!
//! The response capability is deliberately asymmetric: transcription and
//! synthesis run whatever the process-wide selection says, while the response
//! provider is named by the caller per request and resolved through
//! [`Registry::responder`].

use std::collections::HashMap;
use std::sync::Arc;

use voxpipe_core::config::{Config, ProvidersConfig};
use voxpipe_core::{Capability, ConfigError, PipelineError, ProviderSelection};

use crate::response::{GeminiChat, OllamaChat, OpenAiCompatChat};
use crate::synthesis::{ElevenLabsSpeech, LocalSpeech, OpenAiSpeech};
use crate::transcription::WhisperHttp;
use crate::traits::{Respond, Synthesize, Transcribe};

/// Known transcription backends.
pub const TRANSCRIPTION_PROVIDERS: &[&str] = &["openai", "groq"];
/// Known response backends.
pub const RESPONSE_PROVIDERS: &[&str] = &["openai", "groq", "gemini", "ollama"];
/// Known synthesis backends.
pub const SYNTHESIS_PROVIDERS: &[&str] = &["openai", "elevenlabs", "melotts"];

/// Default model per transcription provider.
fn transcription_default_model(provider: &str) -> &'static str {
    match provider {
        "openai" => "whisper-1",
        _ => "whisper-large-v3",
    }
}

/// Default model per synthesis provider.
fn synthesis_default_model(provider: &str) -> &'static str {
    match provider {
        "openai" => "tts-1",
        "elevenlabs" => "eleven_multilingual_v2",
        _ => "melo-en",
    }
}

/// Startup-resolved provider selections, credentials, and adapters.
pub struct Registry {
    transcription: ProviderSelection,
    response_default: ProviderSelection,
    synthesis: ProviderSelection,
    transcriber: Arc<dyn Transcribe>,
    responders: HashMap<String, Arc<dyn Respond>>,
    synthesizer: Arc<dyn Synthesize>,
    providers: ProvidersConfig,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("transcription", &self.transcription)
            .field("response_default", &self.response_default)
            .field("synthesis", &self.synthesis)
            .field("responders", &self.responders.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Registry {
    /// Build the registry from static configuration.
    ///
    /// Fails only on malformed configuration (a selection naming a provider
    /// outside the known set) — a startup-fatal condition, never a
    /// per-request error.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let creds = &config.providers;

        // Transcription — process-wide selection.
        let t = &config.pipeline.transcription;
        let transcriber: Arc<dyn Transcribe> = match t.provider.as_str() {
            "openai" => Arc::new(WhisperHttp::openai(
                &creds.openai.api_key,
                creds.openai.api_base.as_deref(),
                t.model.as_deref(),
            )),
            "groq" => Arc::new(WhisperHttp::groq(
                &creds.groq.api_key,
                creds.groq.api_base.as_deref(),
                t.model.as_deref(),
            )),
            other => {
                return Err(ConfigError::UnknownProvider {
                    capability: Capability::Transcription,
                    name: other.to_string(),
                })
            }
        };
        let transcription = ProviderSelection::new(
            Capability::Transcription,
            t.provider.clone(),
            t.model
                .clone()
                .unwrap_or_else(|| transcription_default_model(&t.provider).to_string()),
        );

        // Response — every known backend is constructed; the caller picks per
        // request.
        let models = &config.pipeline.response.models;
        let mut responders: HashMap<String, Arc<dyn Respond>> = HashMap::new();
        responders.insert(
            "openai".to_string(),
            Arc::new(OpenAiCompatChat::openai(
                &creds.openai.api_key,
                creds.openai.api_base.as_deref(),
                &models.openai,
            )),
        );
        responders.insert(
            "groq".to_string(),
            Arc::new(OpenAiCompatChat::groq(
                &creds.groq.api_key,
                creds.groq.api_base.as_deref(),
                &models.groq,
            )),
        );
        responders.insert(
            "gemini".to_string(),
            Arc::new(GeminiChat::new(
                creds.gemini.api_key.clone(),
                creds.gemini.api_base.as_deref(),
                models.gemini.clone(),
            )),
        );
        responders.insert(
            "ollama".to_string(),
            Arc::new(OllamaChat::new(
                creds.ollama.api_base.as_deref(),
                models.ollama.clone(),
            )),
        );

        let default = &config.pipeline.response.default_provider;
        let default_model =
            models
                .model_for(default)
                .ok_or_else(|| ConfigError::UnknownProvider {
                    capability: Capability::Response,
                    name: default.clone(),
                })?;
        let response_default =
            ProviderSelection::new(Capability::Response, default.clone(), default_model);

        // Synthesis — process-wide selection.
        let s = &config.pipeline.synthesis;
        let synthesizer: Arc<dyn Synthesize> = match s.provider.as_str() {
            "openai" => Arc::new(OpenAiSpeech::new(
                &creds.openai.api_key,
                creds.openai.api_base.as_deref(),
                s.model.as_deref(),
                s.voice.as_deref(),
            )),
            "elevenlabs" => Arc::new(ElevenLabsSpeech::new(
                &creds.elevenlabs.api_key,
                creds.elevenlabs.api_base.as_deref(),
                s.model.as_deref(),
                s.voice.as_deref(),
            )),
            // The local service; `voice` doubles as its speaker id.
            "melotts" => Arc::new(LocalSpeech::new(
                config.pipeline.local_tts_url.clone(),
                s.voice.clone(),
            )),
            other => {
                return Err(ConfigError::UnknownProvider {
                    capability: Capability::Synthesis,
                    name: other.to_string(),
                })
            }
        };
        let synthesis = ProviderSelection::new(
            Capability::Synthesis,
            s.provider.clone(),
            s.model
                .clone()
                .unwrap_or_else(|| synthesis_default_model(&s.provider).to_string()),
        );

        Ok(Self::assemble(
            transcription,
            transcriber,
            response_default,
            responders,
            synthesis,
            synthesizer,
            creds.clone(),
        ))
    }

    /// Assemble a registry from already-constructed parts.
    ///
    /// This is the injection seam: `from_config` uses it with the real
    /// adapters, tests use it with fakes.
    pub fn assemble(
        transcription: ProviderSelection,
        transcriber: Arc<dyn Transcribe>,
        response_default: ProviderSelection,
        responders: HashMap<String, Arc<dyn Respond>>,
        synthesis: ProviderSelection,
        synthesizer: Arc<dyn Synthesize>,
        providers: ProvidersConfig,
    ) -> Self {
        Self {
            transcription,
            response_default,
            synthesis,
            transcriber,
            responders,
            synthesizer,
            providers,
        }
    }

    /// Credential for `(capability, provider)`, `None` when the provider
    /// needs none (local backends) or the name is unknown.
    ///
    /// Pure function of the startup configuration.
    pub fn credential(&self, capability: Capability, provider: &str) -> Option<&str> {
        let key = match (capability, provider) {
            (_, "openai") => &self.providers.openai.api_key,
            (Capability::Transcription | Capability::Response, "groq") => {
                &self.providers.groq.api_key
            }
            (Capability::Response, "gemini") => &self.providers.gemini.api_key,
            (Capability::Synthesis, "elevenlabs") => &self.providers.elevenlabs.api_key,
            // ollama and melotts are credential-free by design.
            _ => return None,
        };
        if key.is_empty() {
            None
        } else {
            Some(key)
        }
    }

    /// The active selection for a capability.
    ///
    /// For the response capability this is the configured default; the
    /// effective provider is the caller-supplied name per request.
    pub fn active(&self, capability: Capability) -> &ProviderSelection {
        match capability {
            Capability::Transcription => &self.transcription,
            Capability::Response => &self.response_default,
            Capability::Synthesis => &self.synthesis,
        }
    }

    /// The transcription adapter for the active selection.
    pub fn transcriber(&self) -> Arc<dyn Transcribe> {
        Arc::clone(&self.transcriber)
    }

    /// The synthesis adapter for the active selection.
    pub fn synthesizer(&self) -> Arc<dyn Synthesize> {
        Arc::clone(&self.synthesizer)
    }

    /// Resolve a caller-supplied response provider name.
    pub fn responder(&self, name: &str) -> Result<Arc<dyn Respond>, PipelineError> {
        self.responders
            .get(name)
            .map(Arc::clone)
            .ok_or_else(|| PipelineError::UnsupportedProvider {
                capability: Capability::Response,
                name: name.to_string(),
            })
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
