//! l10-sessions - Meeting session timing service
//!
//! Serves the meeting-session REST API and SSE event stream, and ends stale
//! sessions in the background.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use l10_common::config::{RootFolderInitializer, RootFolderResolver, TomlConfig};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use l10_sessions::{build_router, cleanup, db, AppState};

/// Command-line arguments for l10-sessions
#[derive(Parser, Debug)]
#[command(name = "l10-sessions")]
#[command(about = "Meeting session timing service")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "5730", env = "L10_PORT")]
    port: u16,

    /// Address to bind
    #[arg(short, long, default_value = "127.0.0.1", env = "L10_BIND")]
    bind: IpAddr,

    /// Folder holding the database
    #[arg(short, long, env = "L10_ROOT_FOLDER")]
    root_folder: Option<PathBuf>,

    /// TOML config file (pace thresholds, cleanup, agendas)
    #[arg(short, long, env = "L10_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "l10_sessions=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    info!("Starting l10-sessions v{}", env!("CARGO_PKG_VERSION"));

    let config = TomlConfig::load(args.config.as_deref()).context("Failed to load config")?;

    let root_folder = RootFolderResolver::new("l10-sessions")
        .with_cli_arg(args.root_folder.clone())
        .with_config(&config)
        .resolve();
    let initializer = RootFolderInitializer::new(root_folder);
    initializer
        .ensure_directory_exists()
        .context("Failed to initialize root folder")?;

    let db_path = initializer.database_path();
    info!("Database: {}", db_path.display());
    let pool = db::init_database(&db_path)
        .await
        .context("Failed to open database")?;

    let state = AppState::new(pool.clone(), &config);

    let cancel = CancellationToken::new();
    let cleanup_task = cleanup::spawn_cleanup_task(
        state.lifecycle.clone(),
        pool,
        state.cleanup,
        cancel.clone(),
    );

    let app = build_router(state);
    let addr = SocketAddr::new(args.bind, args.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    cancel.cancel();
    cleanup_task.await.context("Cleanup task panicked")?;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
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
