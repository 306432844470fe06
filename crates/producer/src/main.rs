//! log-producer - forwards stdin lines to the LogCentral service

use anyhow::{Context, Result};
use log_producer::{api, config::ProducerConfig, forward};
use logcentral_lib::{
    health::{components, ComponentHealth, HealthRegistry},
    observability::{ClientMetrics, StructuredLogger},
    Connection, ConnectionManager, ConnectionState, GrpcEndpoint,
};
use std::sync::Arc;
use tokio::io::BufReader;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const PRODUCER_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json().with_writer(std::io::stderr))
        .init();

    let config = ProducerConfig::load()?;
    let logger = StructuredLogger::new("producer");
    logger.log_startup(PRODUCER_VERSION, &config.endpoint);

    let health_registry = HealthRegistry::new();
    health_registry
        .register(components::CONNECTION, ComponentHealth::unhealthy("not connected"))
        .await;
    health_registry
        .register(components::HEARTBEAT, ComponentHealth::healthy())
        .await;
    health_registry
        .register(components::FLUSH, ComponentHealth::healthy())
        .await;
    health_registry
        .register(components::STREAM, ComponentHealth::healthy())
        .await;

    // Register metrics before the first scrape
    let metrics = ClientMetrics::new();
    metrics.set_connected(false);

    let endpoint =
        Arc::new(GrpcEndpoint::new(config.grpc_config()?).with_health(health_registry.clone()));
    let manager = Arc::new(
        ConnectionManager::builder(endpoint, config.name.clone())
            .config(config.client_config()?)
            .health(health_registry.clone())
            .build()?,
    );

    let app_state = Arc::new(api::AppState::new(health_registry, manager.clone()));
    let api_port = config.api_port;
    tokio::spawn(async move {
        if let Err(e) = api::serve(api_port, app_state).await {
            warn!(error = %e, "API server stopped");
        }
    });

    // Lines read before the session is up stay buffered
    let connector = {
        let manager = manager.clone();
        let (initial, max) = (config.initial_backoff(), config.max_backoff());
        tokio::spawn(async move {
            forward::connect_with_backoff(&manager, "startup", initial, max).await;
        })
    };

    let stdin = BufReader::new(tokio::io::stdin());
    let reason = tokio::select! {
        result = forward::forward_lines(stdin, &manager, config.ignore_filter) => {
            let stats = result.context("Failed to read stdin")?;
            info!(forwarded = stats.forwarded, filtered = stats.filtered, "Input closed");
            "end of input"
        }
        _ = tokio::signal::ctrl_c() => "SIGINT received",
    };

    connector.abort();
    // Let the flush task drain what is left before closing the session
    if manager.state() == ConnectionState::Connected {
        let deadline = tokio::time::Instant::now() + manager.config().request_timeout;
        while manager.pending() > 0 && tokio::time::Instant::now() < deadline {
            tokio::time::sleep(manager.config().flush_interval).await;
        }
    }

    logger.log_shutdown(reason);
    if let Err(e) = manager.disconnect("shutdown").await {
        warn!(error = %e, pending = manager.pending(), "Disconnect failed");
    }

    Ok(())
}
