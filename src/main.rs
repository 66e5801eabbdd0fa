use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use voice_memos::audio::run_level_meter;
use voice_memos::{create_router, AppState, Config, LocalHost, LocalHostSettings, RecordingManager};

#[derive(Debug, Parser)]
#[command(name = "voice-memos", about = "Record, replay and play back short voice memos")]
struct Cli {
    /// Config file (defaults to config/voice-memos.toml when present)
    #[arg(short, long)]
    config: Option<String>,

    /// Override the HTTP bind address
    #[arg(long)]
    bind: Option<String>,

    /// Override the HTTP port
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let mut cfg = Config::load(cli.config.as_deref())?;
    if let Some(bind) = cli.bind {
        cfg.service.http.bind = bind;
    }
    if let Some(port) = cli.port {
        cfg.service.http.port = port;
    }

    info!("{} v{}", cfg.service.name, env!("CARGO_PKG_VERSION"));
    info!("Recordings directory: {}", cfg.audio.recordings_path.display());
    info!("Prerecorded sound: {}", cfg.audio.asset_path.display());

    let (sink_tx, sink_rx) = mpsc::channel(64);
    tokio::spawn(run_level_meter(sink_rx));

    let host = LocalHost::new(LocalHostSettings::from(&cfg.audio), sink_tx);
    let manager = Arc::new(RecordingManager::new(Arc::new(host), cfg.audio.asset_path.clone()));
    let app = create_router(AppState::new(Arc::clone(&manager)));

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Controls at http://{}/controls", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    let report = manager.teardown().await;
    info!(
        "Shut down: {} sounds released, {} failed",
        report.released, report.failed
    );

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {}", e);
    }
    info!("Shutdown requested");
}
