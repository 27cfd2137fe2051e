//! Swingscan API Server
//!
//! HTTP API serving top movers, EMA annotations and trade recommendations,
//! plus health and metrics endpoints.

use dotenvy::dotenv;
use std::sync::Arc;
use std::time::Duration;
use swingscan::config::{get_environment, get_port, EngineConfig};
use swingscan::core::{start_server, MoverService};
use swingscan::logging;
use swingscan::metrics::Metrics;
use swingscan::services::source_from_env;
use tokio::signal;
use tracing::{debug, info};

const CACHE_PURGE_INTERVAL: Duration = Duration::from_secs(5 * 60);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    logging::init_logging();

    let port = get_port();
    let config = EngineConfig::from_env();
    info!("Starting Swingscan API Server");
    info!(environment = %get_environment(), "Environment");
    info!(
        max_concurrent_fetches = config.max_concurrent_fetches,
        fetch_timeout_secs = config.fetch_timeout.as_secs(),
        fetch_candle_count = config.fetch_candle_count,
        "Engine configuration"
    );

    let metrics = Arc::new(Metrics::new()?);
    let source = source_from_env().await;
    let service = Arc::new(MoverService::new(source, config).with_metrics(metrics.clone()));

    // Expired entries are never served, this only bounds memory.
    let cache = service.cache().clone();
    let purge_handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(CACHE_PURGE_INTERVAL);
        loop {
            ticker.tick().await;
            let purged = cache.purge_expired();
            debug!(purged = purged, remaining = cache.len(), "Purged expired candle series");
        }
    });

    start_server(port, service, metrics, async {
        signal::ctrl_c().await.ok();
        info!("Shutting down API server...");
    })
    .await?;

    purge_handle.abort();
    info!("API server stopped");
    Ok(())
}
