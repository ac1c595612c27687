//! The synthesis endpoint — `POST /api/tts`.
//!
//! One fixed output path serves every request: the render lock serializes
//! file access, and the file is overwritten per call. Callers that need true
//! concurrency must issue one request at a time — an accepted constraint of
//! this service, documented at the pipeline's `LocalSpeech` adapter.

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{error, info};

use crate::engine::SpeechEngine;

/// Shared service state.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<dyn SpeechEngine>,
    pub output_path: PathBuf,
    /// Serializes renders onto the fixed output path.
    pub render_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(engine: Arc<dyn SpeechEngine>, output_path: PathBuf) -> Self {
        Self {
            engine,
            output_path,
            render_lock: Arc::new(Mutex::new(())),
        }
    }
}

/// Synthesis request body.
#[derive(Debug, Deserialize)]
pub struct TtsRequest {
    pub text: String,
    #[serde(default = "default_speaker")]
    pub speaker_id: String,
}

fn default_speaker() -> String {
    "EN-US".to_string()
}

/// Create the service router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/tts", post(generate))
        .with_state(state)
}

/// Render speech for `text` and return the WAV bytes.
async fn generate(
    State(state): State<AppState>,
    Json(request): Json<TtsRequest>,
) -> Result<Response, (StatusCode, String)> {
    // Client error, checked before the model is touched.
    if !state.engine.speakers().iter().any(|s| s == &request.speaker_id) {
        return Err((StatusCode::BAD_REQUEST, "Invalid speaker_id".to_string()));
    }

    info!(speaker = %request.speaker_id, chars = request.text.len(), "rendering speech");

    let _guard = state.render_lock.lock().await;

    let engine = Arc::clone(&state.engine);
    let output_path = state.output_path.clone();
    let text = request.text;
    let speaker = request.speaker_id;

    // Rendering is CPU-bound; keep it off the async workers.
    let rendered = tokio::task::spawn_blocking(move || {
        engine.render(&text, &speaker, &output_path)
    })
    .await;

    match rendered {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            error!(error = ?e, "speech rendering failed");
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to generate audio".to_string(),
            ));
        }
        Err(e) => {
            error!(error = %e, "render task panicked");
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to generate audio".to_string(),
            ));
        }
    }

    let bytes = tokio::fs::read(&state.output_path).await.map_err(|e| {
        error!(error = %e, "failed to read rendered audio");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to generate audio".to_string(),
        )
    })?;

    Ok(([(header::CONTENT_TYPE, "audio/wav")], bytes).into_response())
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
