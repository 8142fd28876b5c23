//! DormHub Server: room-bed and tag allocation for trainee intake.
//!
//! Main entry point that wires all crates together and starts the server.

use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, fmt};

use dormhub_core::config::AppConfig;
use dormhub_core::error::AppError;
use dormhub_core::events::EventBus;
use dormhub_service::Sweeper;
use dormhub_worker::{ChangeFeedTrigger, CronScheduler, SweepQueue, SweepReason, SweepRunner};

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

/// Load configuration from `config/` and the environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let dir = std::env::var("DORMHUB_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());
    let env = std::env::var("DORMHUB_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&dir, &env)
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
    tracing::info!("Starting DormHub v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Inventory store ──────────────────────────────────
    tracing::info!(backend = ?config.database.backend, "Opening inventory store...");
    let store = dormhub_database::store::open(&config.database).await?;
    tracing::info!("Inventory store ready");

    let events = EventBus::default();
    let (sweeps, sweep_requests) = SweepQueue::new();

    // ── Step 2: Shutdown channel ─────────────────────────────────
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // ── Step 3: Reconciliation worker ────────────────────────────
    let mut scheduler = None;
    let mut background = Vec::new();

    if config.worker.enabled {
        tracing::info!("Starting reconciliation worker...");

        let sweeper = Sweeper::new(
            Arc::clone(&store),
            events.clone(),
            config.allocation.vip_label_prefix.clone(),
        );
        let runner = SweepRunner::new(sweeper, sweep_requests);
        let runner_cancel = shutdown_rx.clone();
        background.push(tokio::spawn(async move {
            runner.run(runner_cancel).await;
        }));

        if config.worker.sweep_on_change {
            let trigger = ChangeFeedTrigger::new(events.clone(), sweeps.clone());
            background.push(trigger.spawn(shutdown_rx.clone()));
        }

        if !config.worker.sweep_schedule.trim().is_empty() {
            let cron = CronScheduler::new(sweeps.clone()).await?;
            cron.register_periodic_sweep(&config.worker.sweep_schedule)
                .await?;
            cron.start().await?;
            scheduler = Some(cron);
        }

        sweeps.request(SweepReason::Startup);
        tracing::info!("Reconciliation worker started");
    } else {
        // Manual sweep requests are refused while no runner listens.
        drop(sweep_requests);
        tracing::info!("Reconciliation worker disabled");
    }

    // ── Step 4: Build and start HTTP server ──────────────────────
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    let worker_timeout = Duration::from_secs(config.worker.shutdown_timeout_seconds);

    let app_state = dormhub_api::AppState::new(Arc::new(config), store, events, sweeps);
    let app = dormhub_api::build_router(app_state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!("DormHub server listening on {}", addr);

    // ── Step 5: Graceful shutdown ────────────────────────────────
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            tracing::info!("Shutdown signal received, starting graceful shutdown...");
            let _ = shutdown_tx.send(true);
        })
        .into_future();

    // Open availability streams never finish on their own.
    let mut drain_rx = shutdown_rx.clone();
    let drain_deadline = async move {
        let _ = drain_rx.wait_for(|stop| *stop).await;
        tokio::time::sleep(grace).await;
    };

    tokio::select! {
        result = server => result.map_err(|e| AppError::internal(format!("Server error: {}", e)))?,
        _ = drain_deadline => tracing::warn!("Connections still open after {:?}, closing", grace),
    }

    // ── Step 6: Wait for background tasks ───────────────────────
    tracing::info!("Waiting for background tasks to complete...");

    if let Some(mut cron) = scheduler {
        if let Err(e) = cron.shutdown().await {
            tracing::warn!("Scheduler shutdown failed: {}", e);
        }
    }
    for handle in background {
        if tokio::time::timeout(worker_timeout, handle).await.is_err() {
            tracing::warn!("Background task did not stop within {:?}", worker_timeout);
        }
    }

    tracing::info!("DormHub server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
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
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
