//! Voxpipe server — entry point.
//!
//! Startup sequence:
//! 1. Load config (file + env overrides)
//! 2. Build the provider registry — malformed selections abort here
//! 3. Create the media directory
//! 4. Serve the router

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use voxpipe_core::config::load_config;
use voxpipe_core::utils::expand_home;
use voxpipe_pipeline::Pipeline;
use voxpipe_providers::Registry;
use voxpipe_server::state::AppState;
use voxpipe_server::build_router;

/// Voxpipe — voice assistant orchestration backend
#[derive(Parser)]
#[command(name = "voxpipe", version, about, long_about = None)]
struct Args {
    /// Config file path (default: ~/.voxpipe/config.json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, default_value_t = false)]
    logs: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.logs);

    let config = load_config(args.config.as_deref());

    let registry = Registry::from_config(&config).context("invalid provider configuration")?;
    info!(
        transcription = %registry.active(voxpipe_core::Capability::Transcription).provider,
        synthesis = %registry.active(voxpipe_core::Capability::Synthesis).provider,
        response_default = %registry.active(voxpipe_core::Capability::Response).provider,
        "provider registry ready"
    );

    let media_dir = expand_home(&config.server.media_dir);
    std::fs::create_dir_all(&media_dir)
        .with_context(|| format!("failed to create media directory {}", media_dir.display()))?;

    let pipeline = Pipeline::new(
        Arc::new(registry),
        &media_dir,
        &config.pipeline.system_prompt,
    );
    let app = build_router(AppState::new(pipeline), &media_dir);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!(%addr, media_dir = %media_dir.display(), "voxpipe listening");
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
