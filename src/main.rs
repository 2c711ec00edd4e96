//! Warmup server: task dispatch backend for a fleet of Android devices.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, fmt};

use warmup_api::{AppState, build_router};
use warmup_core::config::AppConfig;
use warmup_core::error::AppError;
use warmup_database::Persistence;
use warmup_worker::{CronScheduler, SweepRegistry};

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from file and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let base = std::env::var("WARMUP_CONFIG").unwrap_or_else(|_| "config/default".to_string());
    let env = std::env::var("WARMUP_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load_from(&base, &env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting warmup server v{}", env!("CARGO_PKG_VERSION"));
    let config = Arc::new(config);

    // ── Step 1: Persistence ──────────────────────────────────────
    tracing::info!(
        "Opening persistence (provider: {})...",
        config.database.provider
    );
    let persistence = Persistence::open(&config.database).await?;

    // ── Step 2: Services and realtime fan-out ────────────────────
    let state = AppState::build(Arc::clone(&config), persistence.clone());
    tracing::info!("Services initialized");

    // ── Step 3: Sweeper ──────────────────────────────────────────
    let scheduler = if config.sweeper.enabled {
        tracing::info!("Starting sweeper...");
        let registry = SweepRegistry::with_defaults(
            &config.sweeper,
            Arc::clone(&state.tasks),
            Arc::clone(&state.devices),
        );
        let scheduler = CronScheduler::new().await?;
        scheduler.register_all(&registry).await?;
        scheduler.start().await?;
        tracing::info!(sweeps = ?registry.names(), "Sweeper started");
        Some(scheduler)
    } else {
        tracing::info!("Sweeper disabled");
        None
    };

    // ── Step 4: HTTP server ──────────────────────────────────────
    let app = build_router(state);
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {}: {}", addr, e)))?;
    tracing::info!("Warmup server listening on {}", addr);

    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.changed().await;
            })
            .await
    });

    // ── Step 5: Graceful shutdown ────────────────────────────────
    let served = tokio::select! {
        result = &mut server => Some(result),
        _ = shutdown_signal() => None,
    };

    match served {
        Some(result) => log_server_exit(result),
        None => {
            tracing::info!("Shutdown signal received, starting graceful shutdown...");
            let _ = shutdown_tx.send(true);
            let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
            match tokio::time::timeout(grace, &mut server).await {
                Ok(result) => log_server_exit(result),
                Err(_) => {
                    tracing::warn!(
                        "Connections still open after {}s, closing them",
                        grace.as_secs()
                    );
                    server.abort();
                }
            }
        }
    }

    // ── Step 6: Stop background work ─────────────────────────────
    if let Some(scheduler) = scheduler {
        if let Err(e) = scheduler.shutdown().await {
            tracing::warn!("Sweeper shutdown error: {}", e);
        }
    }
    persistence.close().await;

    tracing::info!("Warmup server stopped");
    Ok(())
}

fn log_server_exit(result: Result<std::io::Result<()>, tokio::task::JoinError>) {
    match result {
        Ok(Ok(())) => tracing::info!("HTTP server stopped"),
        Ok(Err(e)) => tracing::error!("HTTP server error: {}", e),
        Err(e) => tracing::error!("HTTP server task failed: {}", e),
    }
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
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
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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
}
