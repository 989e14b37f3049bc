//! podctl daemon
//!
//! Serves the pod control API over HTTP and drives the control plane on
//! behalf of operators.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use podctl_core::config::{self, load_inventory, ControllerConfig};
use podctl_orchestrator::{api, ControllerState, TaskTracker};
use podctl_sim::SimulatedControlPlane;

#[derive(Parser)]
#[command(name = "podctl")]
#[command(about = "Lab pod controller daemon")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bind address (overrides config)
    #[arg(short, long)]
    bind: Option<String>,

    /// Path to the pod inventory (overrides config)
    #[arg(short, long)]
    inventory: Option<PathBuf>,

    /// Run in foreground with verbose output
    #[arg(short, long)]
    foreground: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.foreground { "debug" } else { &args.log_level };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("podctl starting...");

    // Load configuration
    let mut config = if let Some(config_path) = &args.config {
        config::load_config(config_path)
            .with_context(|| format!("Failed to load config from {:?}", config_path))?
    } else {
        let default_path = config::default_config_path();
        if default_path.exists() {
            config::load_config(&default_path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {:?}: {}", default_path, e);
                ControllerConfig::default()
            })
        } else {
            tracing::info!("Using default configuration");
            ControllerConfig::default()
        }
    };
    config
        .connection
        .apply_env()
        .context("Invalid control plane settings in environment")?;

    let bind_addr = args.bind.unwrap_or_else(|| config.bind_address.clone());
    let inventory_path = args.inventory.unwrap_or_else(|| config.inventory_path.clone());

    let inventory = load_inventory(&inventory_path)
        .with_context(|| format!("Failed to load inventory from {:?}", inventory_path))?;
    tracing::info!("Loaded {} pod(s) from {:?}", inventory.pods.len(), inventory_path);

    // Open the control-plane session; there is no degraded mode without one
    let mut backend = SimulatedControlPlane::from_inventory(&inventory);
    if !config.connection.username.is_empty() {
        backend = backend.credentials(&config.connection.username, &config.connection.password);
    }
    let control_plane = backend
        .build()
        .connect(&config.connection)
        .with_context(|| format!("Failed to connect to {}", config.connection.endpoint()))?;
    tracing::info!("Connected to control plane at {}", config.connection.endpoint());

    match config.task_timeout {
        Some(timeout) => tracing::info!("Task waits bounded at {:?}", timeout),
        None => tracing::warn!("Task waits are unbounded"),
    }

    // Create cancellation token for graceful shutdown
    let cancel = CancellationToken::new();
    let tracker = TaskTracker::new()
        .with_timeout(config.task_timeout)
        .with_cancellation(cancel.clone());
    let state = Arc::new(ControllerState::new(inventory, control_plane, tracker));

    // Setup signal handlers
    let cancel_clone = cancel.clone();
    tokio::spawn(async move {
        let ctrl_c = tokio::signal::ctrl_c();

        #[cfg(unix)]
        let terminate = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut signal) => {
                    signal.recv().await;
                }
                Err(e) => {
                    tracing::warn!("Failed to install SIGTERM handler: {}", e);
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {
                tracing::info!("Received Ctrl+C, initiating shutdown...");
            }
            _ = terminate => {
                tracing::info!("Received SIGTERM, initiating shutdown...");
            }
        }

        cancel_clone.cancel();
    });

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind HTTP API to {}", bind_addr))?;
    tracing::info!("HTTP API listening on {}", bind_addr);

    axum::serve(listener, api::router(state))
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await
        .context("HTTP server failed")?;

    tracing::info!("podctl shutdown complete");
    Ok(())
}
