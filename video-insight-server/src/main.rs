//! Video Insight Server
//!
//! Web page for asking questions about online videos using Gemini.

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use video_insight_common::tracing::init_tracing;
use video_insight_common::{Config, ModelRegistry, WebServerBuilder};
use video_insight_server::{
    AppState, GeminiFiles, MediaStore, PageRenderer, Pipeline, VideoAgent, YtDlp, build_router,
};

/// Command-line arguments for the server.
#[derive(Parser, Debug)]
#[command(name = "video-insight-server")]
#[command(about = "Answer questions about online videos using Gemini and web search")]
struct Args {
    /// Host to bind (overrides HOST)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides PORT)
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    tracing::info!("video-insight-server starting...");

    let args = Args::parse();

    let config = Config::from_env()?;
    tracing::info!(
        model = %config.model,
        api_base_url = %config.api_base_url,
        "Configuration loaded"
    );

    let http = reqwest::Client::builder()
        .build()
        .context("Failed to build HTTP client")?;

    // One agent handle for the life of the process.
    let agent = Arc::new(VideoAgent::from_config(&config, http.clone()));
    tracing::info!(agent = agent.name(), model = agent.model(), "Agent ready");

    let downloader = YtDlp::from_config(&config);
    match downloader.version().await {
        Ok(version) => tracing::info!(version = %version, "Found yt-dlp"),
        Err(e) => tracing::warn!(error = %e, "yt-dlp is not available; downloads will fail"),
    }

    let media = MediaStore::new(config.media_cache_entries, config.media_cache_max_bytes);
    let pipeline = Pipeline::new(
        Arc::new(downloader),
        Arc::new(GeminiFiles::new(config.clone(), http)),
        agent,
        media.clone(),
    );
    let renderer = PageRenderer::new(ModelRegistry::display_name(&config.model))
        .context("Failed to load page template")?;

    let state = AppState {
        pipeline: Arc::new(pipeline),
        renderer: Arc::new(renderer),
        media,
    };

    let host = args.host.unwrap_or_else(|| config.host.clone());
    let port = args.port.unwrap_or(config.port);
    tracing::info!(host = %host, port, "Starting HTTP server");

    WebServerBuilder::new(build_router(state))
        .with_address(host, port)
        .run()
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}
