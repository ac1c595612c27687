//! The process endpoint — one form submission, one pipeline run.

use axum::extract::{Multipart, State};
use axum::Json;
use tracing::info;

use voxpipe_core::{PipelineError, PipelineResult, RequestInput};

use crate::error::ApiError;
use crate::state::AppState;

/// Liveness message.
pub async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": "Voice assistant backend is running." }))
}

/// `POST /api/process` — fields: `responseModel` (required), plus exactly one
/// of `text` / `audio_file`.
pub async fn handle(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<PipelineResult>, ApiError> {
    let mut response_model: Option<String> = None;
    let mut text: Option<String> = None;
    let mut audio: Option<(Vec<u8>, Option<String>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("malformed multipart body: {e}")))?
    {
        // The name borrow must end before the field is consumed below.
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("responseModel") => {
                response_model = Some(field.text().await.map_err(bad_field)?);
            }
            Some("text") => {
                let value = field.text().await.map_err(bad_field)?;
                // Browsers submit empty fields for unfilled inputs.
                if !value.trim().is_empty() {
                    text = Some(value);
                }
            }
            Some("audio_file") => {
                let filename = field.file_name().map(str::to_string);
                let bytes = field.bytes().await.map_err(bad_field)?;
                if !bytes.is_empty() {
                    audio = Some((bytes.to_vec(), filename));
                }
            }
            _ => {}
        }
    }

    let response_model = response_model
        .filter(|m| !m.is_empty())
        .ok_or_else(|| ApiError::bad_request("'responseModel' is required"))?;

    // Exactly one input kind — rejected here, before any adapter runs or any
    // artifact is created.
    let input = match (text, audio) {
        (Some(text), None) => RequestInput::Text(text),
        (None, Some((bytes, filename))) => RequestInput::Audio { bytes, filename },
        _ => return Err(PipelineError::InvalidInput.into()),
    };

    info!(
        model = %response_model,
        voice = input.is_voice(),
        "processing request"
    );

    let result = state.pipeline.handle(&response_model, input).await?;
    Ok(Json(result))
}

fn bad_field(e: axum::extract::multipart::MultipartError) -> ApiError {
    ApiError::bad_request(format!("unreadable multipart field: {e}"))
}
