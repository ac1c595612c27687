//! Config loader — reads `~/.voxpipe/config.json` and merges env vars.
//!
//! # Loading precedence
//! 1. Defaults (from `Config::default()`)
//! 2. JSON file at `~/.voxpipe/config.json` (or an explicit path)
//! 3. Environment variables `VOXPIPE_<SECTION>__<FIELD>` (override JSON)
//!
//! Provider keys additionally honor the conventional names
//! (`OPENAI_API_KEY`, `GROQ_API_KEY`, `GOOGLE_API_KEY`, `ELEVENLABS_API_KEY`)
//! when no Voxpipe-scoped variable or file entry set one.

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::schema::{Config, ProviderConfig};

/// Default config file path.
pub fn get_config_path() -> PathBuf {
    crate::utils::get_data_path().join("config.json")
}

/// Load configuration from the default path + env vars.
///
/// Falls back to `Config::default()` if the file doesn't exist or can't be
/// parsed — a malformed credentials *section* still fails fast later, at
/// registry construction.
pub fn load_config(path: Option<&Path>) -> Config {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);
    load_config_from_path(&config_path)
}

/// Load config from a specific file path.
fn load_config_from_path(path: &Path) -> Config {
    if !path.exists() {
        info!("No config file found at {}, using defaults", path.display());
        return apply_env_overrides(Config::default());
    }

    debug!("Loading config from {}", path.display());

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file {}: {}", path.display(), e);
            return apply_env_overrides(Config::default());
        }
    };

    let config: Config = match serde_json::from_str(&content) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to parse config JSON: {}", e);
            return apply_env_overrides(Config::default());
        }
    };

    apply_env_overrides(config)
}

/// Apply environment variable overrides on top of a loaded config.
///
/// Env var format: `VOXPIPE_<SECTION>__<FIELD>` (double underscore as
/// delimiter).
fn apply_env_overrides(mut config: Config) -> Config {
    // Server
    if let Ok(val) = std::env::var("VOXPIPE_SERVER__HOST") {
        config.server.host = val;
    }
    if let Ok(val) = std::env::var("VOXPIPE_SERVER__PORT") {
        if let Ok(p) = val.parse::<u16>() {
            config.server.port = p;
        }
    }
    if let Ok(val) = std::env::var("VOXPIPE_SERVER__MEDIA_DIR") {
        config.server.media_dir = val;
    }

    // Pipeline selections
    if let Ok(val) = std::env::var("VOXPIPE_PIPELINE__SYSTEM_PROMPT") {
        config.pipeline.system_prompt = val;
    }
    if let Ok(val) = std::env::var("VOXPIPE_PIPELINE__TRANSCRIPTION__PROVIDER") {
        config.pipeline.transcription.provider = val;
    }
    if let Ok(val) = std::env::var("VOXPIPE_PIPELINE__SYNTHESIS__PROVIDER") {
        config.pipeline.synthesis.provider = val;
    }
    if let Ok(val) = std::env::var("VOXPIPE_PIPELINE__RESPONSE__DEFAULT_PROVIDER") {
        config.pipeline.response.default_provider = val;
    }
    if let Ok(val) = std::env::var("VOXPIPE_PIPELINE__LOCAL_TTS_URL") {
        config.pipeline.local_tts_url = val;
    }

    // Provider credentials (by provider name)
    apply_provider_env(&mut config.providers.openai, "OPENAI", Some("OPENAI_API_KEY"));
    apply_provider_env(&mut config.providers.groq, "GROQ", Some("GROQ_API_KEY"));
    apply_provider_env(&mut config.providers.gemini, "GEMINI", Some("GOOGLE_API_KEY"));
    apply_provider_env(
        &mut config.providers.elevenlabs,
        "ELEVENLABS",
        Some("ELEVENLABS_API_KEY"),
    );
    apply_provider_env(&mut config.providers.ollama, "OLLAMA", None);

    config
}

/// Apply env var overrides for a single provider.
///
/// The Voxpipe-scoped variable wins; the conventional name only fills an
/// otherwise-empty key.
fn apply_provider_env(provider: &mut ProviderConfig, name: &str, conventional: Option<&str>) {
    if let Ok(val) = std::env::var(format!("VOXPIPE_PROVIDERS__{name}__API_KEY")) {
        provider.api_key = val;
    }
    if let Ok(val) = std::env::var(format!("VOXPIPE_PROVIDERS__{name}__API_BASE")) {
        provider.api_base = Some(val);
    }
    if provider.api_key.is_empty() {
        if let Some(var) = conventional {
            if let Ok(val) = std::env::var(var) {
                provider.api_key = val;
            }
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
