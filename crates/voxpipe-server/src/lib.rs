//! HTTP boundary for Voxpipe.
//!
//! One form endpoint drives the pipeline; generated audio is served back as
//! static files. CORS is permissive — the browser client may be served from
//! anywhere.

pub mod error;
pub mod process;
pub mod state;

use std::path::Path;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Voice clips can exceed axum's 2 MiB default body cap.
const UPLOAD_BODY_LIMIT: usize = 32 * 1024 * 1024;

/// Create the application router.
pub fn build_router(state: AppState, media_dir: &Path) -> Router {
    Router::new()
        .route("/", get(process::root))
        .route("/api/process", post(process::handle))
        .nest_service("/static", ServeDir::new(media_dir))
        .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
