//! Termset Server: translation set processing for terminology content.
//!
//! Main entry point that wires all crates together and starts the HTTP
//! server and the background worker.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, fmt};

use termset_api::{AppState, build_app};
use termset_client::{ClientFactory, HttpClientFactory};
use termset_core::config::{AppConfig, LogFormat};
use termset_core::error::AppError;
use termset_database::Stores;
use termset_service::TranslationSetService;
use termset_worker::jobs::register_all;
use termset_worker::{CronScheduler, JobExecutor, JobQueue, WorkerRunner};

#[tokio::main]
async fn main() {
    let env = std::env::var("TERMSET_ENV").unwrap_or_else(|_| "development".to_string());
    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);
    tracing::info!("Loaded configuration (env: {})", env);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging. `RUST_LOG` overrides the configured level.
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format {
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        LogFormat::Pretty => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function.
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Termset v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Stores ───────────────────────────────────────────
    let stores = Stores::open(&config.database).await?;
    let (sets, jobs) = (Arc::clone(&stores.sets), Arc::clone(&stores.jobs));
    let queue = Arc::new(JobQueue::new(
        Arc::clone(&jobs),
        config.worker.queue_name.clone(),
    ));

    // ── Step 2: Collaborator clients ─────────────────────────────
    let clients: Arc<dyn ClientFactory> = Arc::new(HttpClientFactory::new(
        config.terminology.clone(),
        config.platform.clone(),
        config.llm.clone(),
    )?);

    // ── Step 3: Worker and scheduler ─────────────────────────────
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let worker_handle = if config.worker.enabled {
        let worker_id = format!("worker-{}", &uuid::Uuid::new_v4().to_string()[..8]);
        let mut executor = JobExecutor::new(Arc::clone(&sets), Arc::clone(&jobs));
        register_all(&mut executor, Arc::clone(&clients), &config.processing);

        let runner = WorkerRunner::new(
            Arc::clone(&queue),
            Arc::new(executor),
            config.worker.clone(),
            worker_id,
        );
        let worker_cancel = shutdown_rx.clone();
        Some(tokio::spawn(async move {
            runner.run(worker_cancel).await;
        }))
    } else {
        tracing::info!("Background worker disabled");
        None
    };

    let mut scheduler = CronScheduler::new().await?;
    scheduler
        .register_stale_job_reclaim(Arc::clone(&jobs), Arc::clone(&sets), &config.worker)
        .await?;
    scheduler.start().await?;

    // ── Step 4: HTTP server ──────────────────────────────────────
    let service = TranslationSetService::new(
        Arc::clone(&sets),
        Arc::clone(&clients),
        Arc::clone(&queue),
        config.processing.clone(),
    );
    let app = build_app(AppState::new(Arc::new(service)), &config.server);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {}: {}", addr, e)))?;
    tracing::info!("Termset server listening on {}", addr);

    // ── Step 5: Graceful shutdown ────────────────────────────────
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            tracing::info!("Shutdown signal received, starting graceful shutdown...");
            let _ = shutdown_tx.send(true);
        })
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    tracing::info!("Waiting for background tasks to complete...");
    if let Err(e) = scheduler.shutdown().await {
        tracing::warn!("Scheduler shutdown failed: {}", e);
    }
    if let Some(handle) = worker_handle {
        let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
        if tokio::time::timeout(grace, handle).await.is_err() {
            tracing::warn!("Worker did not stop within {:?}", grace);
        }
    }
    stores.close().await;

    tracing::info!("Termset server shut down gracefully");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
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
