//! SearX-Relay: search-then-summarize relay
//!
//! This is the main entry point for the application.

use anyhow::Result;
use clap::Parser;
use searx_relay::{
    config,
    network::HttpClient,
    web::{create_router, AppState},
};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Search-then-summarize relay for SearXNG and Ollama-style LLM backends
#[derive(Debug, Parser)]
#[command(name = "searx-relay", version, about)]
struct Cli {
    /// Path to settings.yml
    #[arg(short, long, env = "RELAY_SETTINGS_PATH")]
    config: Option<PathBuf>,

    /// Server port (overrides settings and RELAY_PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Bind address (overrides settings and RELAY_BIND_ADDRESS)
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env must be loaded before clap reads env-backed flags
    let dotenv = dotenvy::dotenv();
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    info!("Starting SearX-Relay v{}", searx_relay::VERSION);
    if let Ok(path) = dotenv {
        info!("Loaded environment from {}", path.display());
    }

    let mut settings = config::load(cli.config.as_deref())?;
    if let Some(port) = cli.port {
        settings.server.port = port;
    }
    if let Some(bind) = cli.bind {
        settings.server.bind_address = bind;
    }
    settings.validate()?;

    if settings.llm.model.is_none() {
        warn!("No model configured; LLM requests will omit the model field");
    }
    info!(
        "Configured {} search endpoints, LLM at {}",
        settings.search.endpoints.len(),
        settings.llm.url
    );

    let client = HttpClient::with_settings(&settings.outgoing)?;
    info!("HTTP client initialized");

    let addr = SocketAddr::new(settings.server.bind_address.parse()?, settings.server.port);
    let state = AppState::new(&settings, client)?;
    let app = create_router(state);

    info!("Starting server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
