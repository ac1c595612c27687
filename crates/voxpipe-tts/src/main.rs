//! Voxpipe local synthesis service — entry point.
//!
//! A single-endpoint HTTP service the pipeline's `melotts` backend talks to.
//! The speech engine is loaded once at startup and shared across requests.

mod engine;
mod service;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use crate::engine::{SpeechEngine, WavetableEngine};
use crate::service::{build_router, AppState};

/// Voxpipe TTS — local speech-synthesis service
#[derive(Parser)]
#[command(name = "voxpipe-tts", version, about, long_about = None)]
struct Args {
    /// Listen address
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Listen port
    #[arg(long, default_value_t = 8001)]
    port: u16,

    /// Rendered-audio path (one file, overwritten per request)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, default_value_t = false)]
    logs: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.logs);

    info!("loading speech engine");
    let engine: Arc<dyn SpeechEngine> = Arc::new(WavetableEngine::new());
    info!(speakers = ?engine.speakers(), "speech engine ready");

    let output_path = args
        .output
        .unwrap_or_else(|| std::env::temp_dir().join("voxpipe_tts_output.wav"));
    let app = build_router(AppState::new(engine, output_path));

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!(%addr, "voxpipe-tts listening");
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("voxpipe=debug,info")
    } else {
        EnvFilter::new("voxpipe=info,warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
