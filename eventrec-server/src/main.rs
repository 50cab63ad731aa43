//! eventrec-server - College event record keeper
//!
//! Loads the event list from the local SQLite store under the root folder and
//! serves the JSON/SSE API on `--bind:--port`.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use eventrec_common::config::{resolve_root_folder, RootFolder, TomlConfig, ROOT_FOLDER_ENV};
use eventrec_common::db::SqliteEventStore;
use eventrec_common::media::HttpUploader;
use eventrec_common::notify::{Notification, NotificationBus};
use eventrec_common::report::ReportExporter;
use eventrec_common::EventRepository;
use eventrec_server::{build_router, AppState};
use tokio::signal;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for eventrec-server
#[derive(Parser, Debug)]
#[command(name = "eventrec-server")]
#[command(about = "College event record keeper")]
#[command(version)]
struct Args {
    /// Root folder holding the database and exported reports
    /// (falls back to EVENTREC_ROOT_FOLDER, then the config file)
    #[arg(short, long)]
    root_folder: Option<PathBuf>,

    /// Port to listen on (overrides the config file)
    #[arg(short, long, env = "EVENTREC_PORT")]
    port: Option<u16>,

    /// Config file (default: platform config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to bind
    #[arg(short, long, default_value = "127.0.0.1")]
    bind: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = TomlConfig::load_or_default(args.config.as_deref())
        .context("Failed to load configuration")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting eventrec-server v{}", env!("CARGO_PKG_VERSION"));

    let root = RootFolder::new(resolve_root_folder(
        args.root_folder.as_deref(),
        ROOT_FOLDER_ENV,
        &config,
    ));
    root.ensure_exists()
        .with_context(|| format!("Failed to create root folder {}", root.path().display()))?;

    let db_path = root.database_path();
    info!("Database path: {}", db_path.display());
    let store = SqliteEventStore::open(&db_path)
        .await
        .context("Failed to open event store")?;
    info!("✓ Connected to database");

    let bus = NotificationBus::new(config.event_bus_capacity());
    tokio::spawn(log_failures(bus.clone()));

    let repository = Arc::new(EventRepository::new(Arc::new(store), bus));
    repository.load().await;
    info!("Event list ready ({} event(s))", repository.len().await);

    let exporter = ReportExporter::new(root.reports_dir(), config.college_name());
    let uploader = HttpUploader::new(config.upload_endpoint(), config.max_upload_bytes())
        .context("Failed to build media uploader")?;
    info!("Reports directory: {}", exporter.output_dir().display());
    info!("Media upload endpoint: {}", uploader.endpoint());

    let state = AppState::new(repository.clone(), exporter, Arc::new(uploader));
    let app = build_router(state);

    let port = args.port.unwrap_or_else(|| config.port());
    let addr = format!("{}:{}", args.bind, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("eventrec-server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // Let queued persists land before exiting
    repository.flush().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Mirror failure notifications into the log
async fn log_failures(bus: NotificationBus) {
    let mut rx = bus.subscribe();
    loop {
        match rx.recv().await {
            Ok(Notification::PersistFailed { reason, .. }) => warn!("Persist failed: {}", reason),
            Ok(Notification::LoadFailed { reason, .. }) => warn!("Load failed: {}", reason),
            Ok(_) => {}
            Err(RecvError::Lagged(skipped)) => {
                warn!("Failure log lagged by {} notification(s)", skipped)
            }
            Err(RecvError::Closed) => break,
        }
    }
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
