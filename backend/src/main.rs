use std::sync::Arc;

use task_api::config::DEFAULT_LOG_FILTER;
use task_api::store::RedisTaskStore;
use task_api::{router, Config, TaskService};
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(error) => {
            tracing::error!(%error, "Configuration error");
            std::process::exit(1);
        }
    };
    let addr = match config.bind_addr() {
        Ok(addr) => addr,
        Err(error) => {
            tracing::error!(%error, "Configuration error");
            std::process::exit(1);
        }
    };

    // The listener is only bound once the database answers.
    let store = match RedisTaskStore::connect(&config.redis_url).await {
        Ok(store) => {
            tracing::info!("Redis connected");
            store
        }
        Err(error) => {
            tracing::error!(%error, "Redis connection error");
            std::process::exit(1);
        }
    };

    let app = router(TaskService::new(Arc::new(store)), config.request_timeout);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(error) => {
            tracing::error!(%error, %addr, "Failed to bind listener");
            std::process::exit(1);
        }
    };
    tracing::info!(%addr, "Server running on port {}", config.port);

    if let Err(error) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(%error, "Server error");
        std::process::exit(1);
    }

    tracing::info!("Server shutdown complete");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::warn!(%error, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::warn!(%error, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        () = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
