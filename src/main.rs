use axum::routing::get;
use metrics_exporter_prometheus::PrometheusBuilder;
use reqwest::Client;
use std::{sync::Arc, time::Duration};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gemfinder::config::AppConfig;
use gemfinder::{routes, telemetry, AppState};

/// Shared HTTP client configuration
const HTTP_CONNECT_TIMEOUT_SECS: u64 = 5;
const HTTP_POOL_IDLE_TIMEOUT_SECS: u64 = 90;

/// Create shared HTTP client with connection pooling.
/// Per-request timeouts are set by the discovery client and the monitor.
fn create_http_client() -> reqwest::Result<Client> {
    Client::builder()
        .connect_timeout(Duration::from_secs(HTTP_CONNECT_TIMEOUT_SECS))
        .pool_idle_timeout(Duration::from_secs(HTTP_POOL_IDLE_TIMEOUT_SECS))
        .pool_max_idle_per_host(10)
        .build()
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for ctrl+c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
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

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gemfinder=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load()?;
    tracing::info!(backend = %config.backend_url, "Configuration loaded successfully");

    // Prometheus recorder must be installed before any metric is touched
    let prometheus_handle = Arc::new(PrometheusBuilder::new().install_recorder()?);
    telemetry::describe();

    let http_client = create_http_client()?;
    tracing::debug!("Shared HTTP client created");

    let probe_interval = config.probe_interval();
    let addr = format!("{}:{}", config.host, config.port);
    let state = AppState::new(config, http_client);

    // Probing stops when this handle is dropped
    let monitor = state.availability.spawn(probe_interval);
    tracing::info!(
        interval_secs = probe_interval.as_secs(),
        "Backend availability monitor started"
    );

    let app = routes::build_router(state).route(
        "/metrics",
        get(telemetry::prometheus_metrics).with_state(prometheus_handle),
    );

    // Start server with graceful shutdown
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if !monitor.is_running() {
        tracing::warn!("Availability monitor had already stopped before shutdown");
    }
    monitor.shutdown().await;
    tracing::info!("Server shutdown complete");

    Ok(())
}
