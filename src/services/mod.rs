//! Candle sources and the batch fetch coordinator.

pub mod fetcher;
pub mod market_data;
pub mod mock;
pub mod rest;

pub use fetcher::CandleFetcher;
pub use market_data::CandleDataSource;
pub use mock::MockCandleSource;
pub use rest::RestCandleSource;

use std::sync::Arc;
use tracing::{info, warn};

const DEMO_SEED: u64 = 42;

/// REST source when `CANDLE_API_URL` is set, otherwise the seeded demo source.
pub async fn source_from_env() -> Arc<dyn CandleDataSource> {
    match crate::config::get_candle_api_url() {
        Some(url) => {
            info!(url = %url, "Using REST candle source at {}", url);
            Arc::new(RestCandleSource::new(url))
        }
        None => {
            warn!("CANDLE_API_URL not set, serving seeded demo candles");
            Arc::new(MockCandleSource::demo(DEMO_SEED).await)
        }
    }
}
