//! Candle data source interface consumed by the fetch coordinator.

use async_trait::async_trait;

use crate::error::ProviderError;
use crate::models::indicators::{CandleSeries, Timeframe};

/// A provider of OHLC candles.
///
/// Implementations return at most `count` of the most recent candles in
/// ascending timestamp order. Every failure is reported as a
/// [`ProviderError`]; callers treat all of them as "no data this round".
#[async_trait]
pub trait CandleDataSource: Send + Sync {
    async fn fetch(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        count: usize,
    ) -> Result<CandleSeries, ProviderError>;

    /// Short label used in logs.
    fn name(&self) -> &str {
        "candle-source"
    }
}
