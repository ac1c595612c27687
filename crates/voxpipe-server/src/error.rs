//! API error handling.
//!
//! Every pipeline failure is logged with full detail server-side and mapped
//! to a `{"detail": …}` body with a human-readable message. Upstream causes,
//! stack detail, and credentials never reach the client.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::{error, warn};

use voxpipe_core::PipelineError;

/// API error type — status plus client-facing detail.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
}

impl ApiError {
    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            detail: detail.into(),
        }
    }

    pub fn bad_gateway(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_GATEWAY,
            detail: detail.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        if err.is_client_error() {
            warn!(error = %err, "rejected request");
        } else {
            // Debug formatting carries the wrapped source chain.
            error!(error = ?err, "pipeline request failed");
        }

        match err {
            PipelineError::InvalidInput => {
                Self::bad_request("Provide exactly one of 'text' or 'audio_file'.")
            }
            // The name came from the caller; echoing it back is safe and useful.
            err @ PipelineError::UnsupportedProvider { .. } => Self::bad_request(err.to_string()),
            PipelineError::TranscriptionFailed(_) => Self::bad_gateway("Transcription failed."),
            PipelineError::ResponseGenerationFailed(_) => {
                Self::bad_gateway("Response generation failed.")
            }
            PipelineError::SynthesisFailed(_) => Self::bad_gateway("Speech synthesis failed."),
            PipelineError::LocalServiceUnavailable(_) => {
                Self::bad_gateway("Speech synthesis service is unavailable.")
            }
        }
    }
}
