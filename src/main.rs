//! trec-report - Property Inspection Report Service
//!
//! HTTP service converting inspection JSON uploads into compiled PDF
//! reports, with an optional AI analysis endpoint.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use trec_report::config::{AppConfig, TomlConfig};
use trec_report::services::LatexCompiler;
use trec_report::AppState;

/// Command-line arguments for trec-report
#[derive(Parser, Debug)]
#[command(name = "trec-report")]
#[command(about = "Property inspection report service")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "TREC_REPORT_PORT")]
    port: Option<u16>,

    /// Directory holding report.tex and the static illustration images
    #[arg(short, long, env = "TREC_REPORT_TEMPLATE_DIR")]
    template_dir: Option<PathBuf>,

    /// Root directory for per-request scratch directories
    #[arg(short, long, env = "TREC_REPORT_OUTPUT_ROOT")]
    output_root: Option<PathBuf>,

    /// Config file path (default: <config dir>/trec-report/config.toml)
    #[arg(short, long, env = "TREC_REPORT_CONFIG")]
    config_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trec_report=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    info!("Starting trec-report (Property Inspection Report Service)");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    // Missing config files degrade to defaults; only parse errors abort
    let toml_config = match args.config_file.clone().or_else(TomlConfig::default_path) {
        Some(path) => TomlConfig::load(&path).context("Failed to load config file")?,
        None => TomlConfig::default(),
    };

    let config = AppConfig::resolve(
        args.port,
        args.template_dir,
        args.output_root,
        &toml_config,
    );

    info!("Template dir: {}", config.template_dir.display());
    info!("Output root: {}", config.output_root.display());
    info!("AI analysis: {}", if config.gemini_api_key.is_some() { "enabled" } else { "disabled" });

    tokio::fs::create_dir_all(&config.output_root)
        .await
        .context("Failed to create output root")?;

    if !config.template_path().exists() {
        warn!(
            "Report template not found at {}; report requests will fail until it exists",
            config.template_path().display()
        );
    }
    if !LatexCompiler::is_available() {
        warn!("pdflatex not found in PATH; report requests will fail");
    }

    let port = config.port;
    let state = AppState::new(config).context("Failed to initialize application state")?;
    let app = trec_report::build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
