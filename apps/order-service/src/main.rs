//! Order Service Binary
//!
//! Serves the order lifecycle API over HTTP.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin order-service -- --config config.yaml
//! ```
//!
//! # Environment Variables
//!
//! - `ORDER_SERVICE_CONFIG`: Config file path (default: config.yaml)
//! - `RUST_LOG`: Log filter, overrides `observability.logging.level`
//!
//! Any `${VAR}` / `${VAR:-default}` placeholder in the config file is
//! resolved from the environment, including variables loaded from `.env`.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use order_service::config::{Config, load_config};
use order_service::infrastructure::ServiceContainer;
use order_service::infrastructure::http::{AppState, create_router};
use order_service::observability::{MetricsConfig, init_metrics};
use order_service::telemetry::init_tracing;
use tokio::net::TcpListener;
use tokio::signal;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Parser)]
#[command(name = "order-service")]
#[command(about = "Order lifecycle service", long_about = None)]
struct Args {
    /// Path to the YAML config file.
    #[arg(long, env = "ORDER_SERVICE_CONFIG", default_value = "config.yaml")]
    config: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();

    let args = Args::parse();
    let config = load_config(Some(args.config.as_str())).context("failed to load configuration")?;

    init_tracing(&config.observability.logging).context("failed to initialize tracing")?;
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %args.config,
        "Starting order service"
    );

    start_metrics(&config)?;

    let container = ServiceContainer::from_config(&config.market_oracle)
        .context("failed to build market oracle client")?;
    tracing::info!(
        base_url = %config.market_oracle.base_url,
        timeout_ms = config.market_oracle.timeout_ms,
        breaker = config.market_oracle.enable_breaker,
        "Market oracle configured"
    );

    let shutdown = CancellationToken::new();
    serve_http(&config, &container, shutdown).await
}

fn start_metrics(config: &Config) -> anyhow::Result<()> {
    let settings = &config.observability.metrics;
    if !settings.enabled {
        return Ok(());
    }

    let addr: SocketAddr = format!("{}:{}", config.server.bind_address, settings.port)
        .parse()
        .context("invalid metrics listen address")?;
    init_metrics(&MetricsConfig::with_addr(addr)).context("failed to start metrics exporter")?;
    tracing::info!(%addr, "Prometheus exporter listening");
    Ok(())
}

async fn serve_http(
    config: &Config,
    container: &ServiceContainer,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let state = AppState::new(container.orchestrator(), env!("CARGO_PKG_VERSION"))
        .with_shutdown(shutdown.clone());
    let app = create_router(state, config.health.enabled);

    let http_addr: SocketAddr = config
        .server
        .http_addr()
        .parse()
        .context("invalid HTTP listen address")?;

    tracing::info!(%http_addr, "HTTP server starting");
    tracing::info!("Endpoints:");
    if config.health.enabled {
        tracing::info!("  GET  /health");
    }
    tracing::info!("  POST /api/v1/orders");
    tracing::info!("  GET  /api/v1/orders/{{order_id}}");
    tracing::info!("  POST /api/v1/orders/{{order_id}}/cancel");
    tracing::info!("  GET  /api/v1/users/{{user_id}}/orders");

    let listener = TcpListener::bind(http_addr)
        .await
        .with_context(|| format!("failed to bind {http_addr}"))?;

    let server = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown.clone(), config.server.shutdown_timeout()));
    let handle = tokio::spawn(async move { server.await });

    await_shutdown(handle, shutdown, config.server.shutdown_timeout()).await
}

/// Wait for the server to drain, giving up once the grace period after the
/// shutdown signal has elapsed.
async fn await_shutdown(
    handle: tokio::task::JoinHandle<std::io::Result<()>>,
    shutdown: CancellationToken,
    grace: Duration,
) -> anyhow::Result<()> {
    let mut handle = handle;
    tokio::select! {
        joined = &mut handle => {
            joined.context("HTTP server task panicked")?.context("HTTP server error")?;
        }
        () = async {
            shutdown.cancelled().await;
            tokio::time::sleep(grace).await;
        } => {
            tracing::warn!(
                timeout_secs = grace.as_secs(),
                "Shutdown grace period elapsed, aborting in-flight requests"
            );
            handle.abort();
        }
    }

    tracing::info!("Order service stopped");
    Ok(())
}

/// Load .env file from current directory or any ancestor directory.
fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}

/// Wait for shutdown signal (SIGTERM or SIGINT), then cancel `shutdown` so
/// in-flight oracle calls abort.
///
/// # Panics
///
/// Panics if signal handlers cannot be installed; the service cannot shut
/// down cleanly without them.
#[allow(clippy::expect_used)]
async fn shutdown_signal(shutdown: CancellationToken, grace: Duration) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("signal handler installation is critical for graceful shutdown");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("SIGTERM handler installation is critical for graceful shutdown")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        }
    }

    shutdown.cancel();

    tracing::info!(timeout_secs = grace.as_secs(), "Graceful shutdown started");
}
