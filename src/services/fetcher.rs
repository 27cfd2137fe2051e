//! Cache-aware, concurrency-bounded batch candle fetching.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, warn};

use super::market_data::CandleDataSource;
use crate::cache::CandleCache;
use crate::config::EngineConfig;
use crate::error::ProviderError;
use crate::metrics::Metrics;
use crate::models::indicators::{CandleSeries, Timeframe};

/// Turns a set of symbols into a partial map of candle series.
///
/// Cache hits are served directly; misses go to the source through a shared
/// semaphore so no more than `max_concurrent_fetches` calls run at once, no
/// matter how many batches are in progress.
#[derive(Clone)]
pub struct CandleFetcher {
    source: Arc<dyn CandleDataSource>,
    cache: Arc<CandleCache>,
    permits: Arc<Semaphore>,
    fetch_timeout: Duration,
    fetch_count: usize,
    metrics: Option<Arc<Metrics>>,
}

impl CandleFetcher {
    pub fn new(
        source: Arc<dyn CandleDataSource>,
        cache: Arc<CandleCache>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            source,
            cache,
            permits: Arc::new(Semaphore::new(config.max_concurrent_fetches.max(1))),
            fetch_timeout: config.fetch_timeout,
            fetch_count: config.fetch_candle_count,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn cache(&self) -> &Arc<CandleCache> {
        &self.cache
    }

    /// Fetch at least `min_candles` candles for each symbol.
    ///
    /// Symbols whose fetch failed are absent from the result. A cached series
    /// shorter than `min_candles` counts as a miss and is replaced.
    pub async fn fetch_batch(
        &self,
        symbols: &[String],
        timeframe: Timeframe,
        min_candles: usize,
    ) -> HashMap<String, CandleSeries> {
        let mut results = HashMap::with_capacity(symbols.len());
        let mut tasks = JoinSet::new();
        let mut seen = HashSet::with_capacity(symbols.len());

        for symbol in symbols {
            if !seen.insert(symbol.as_str()) {
                continue;
            }
            if let Some(series) = self.cached(symbol, timeframe, min_candles) {
                self.record_hit();
                results.insert(symbol.clone(), series);
                continue;
            }
            self.record_miss();

            let fetcher = self.clone();
            let symbol = symbol.clone();
            tasks.spawn(async move {
                let outcome = fetcher.refresh(&symbol, timeframe, min_candles).await;
                (symbol, outcome)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((symbol, Ok(series))) => {
                    results.insert(symbol, series);
                }
                Ok((symbol, Err(e))) => {
                    warn!(
                        symbol = %symbol,
                        timeframe = %timeframe,
                        stage = "fetch",
                        error = %e,
                        "CandleFetcher: omitting {} ({}): {}",
                        symbol,
                        timeframe,
                        e
                    );
                }
                Err(e) => {
                    error!(
                        timeframe = %timeframe,
                        stage = "fetch",
                        error = %e,
                        "CandleFetcher: fetch task aborted"
                    );
                }
            }
        }

        debug!(
            requested = symbols.len(),
            returned = results.len(),
            timeframe = %timeframe,
            "CandleFetcher: batch complete, {}/{} symbols",
            results.len(),
            symbols.len()
        );
        results
    }

    fn cached(&self, symbol: &str, timeframe: Timeframe, min_candles: usize) -> Option<CandleSeries> {
        self.cache
            .get(symbol, timeframe)
            .filter(|series| series.len() >= min_candles)
    }

    /// Single-flight refresh of one key.
    async fn refresh(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        min_candles: usize,
    ) -> Result<CandleSeries, ProviderError> {
        let lock = self.cache.refresh_lock(symbol, timeframe);
        let _guard = lock.lock().await;

        // Another requester may have refreshed this key while we waited.
        if let Some(series) = self.cached(symbol, timeframe, min_candles) {
            return Ok(series);
        }

        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|e| ProviderError::Transport {
                message: format!("fetch pool closed: {}", e),
            })?;

        let count = self.fetch_count.max(min_candles);
        if let Some(ref metrics) = self.metrics {
            metrics.provider_fetches_total.inc();
        }
        let started = Instant::now();
        let outcome = tokio::time::timeout(
            self.fetch_timeout,
            self.source.fetch(symbol, timeframe, count),
        )
        .await
        .unwrap_or(Err(ProviderError::Timeout {
            millis: self.fetch_timeout.as_millis() as u64,
        }));

        if let Some(ref metrics) = self.metrics {
            metrics
                .provider_fetch_duration_seconds
                .observe(started.elapsed().as_secs_f64());
            if outcome.is_err() {
                metrics.provider_fetch_failures_total.inc();
            }
        }

        let series = outcome?;
        if series.is_empty() {
            return Err(ProviderError::MalformedResponse {
                message: "empty candle series".to_string(),
            });
        }
        debug!(
            symbol = %symbol,
            timeframe = %timeframe,
            source = self.source.name(),
            count = series.len(),
            "CandleFetcher: fetched {} candles for {}",
            series.len(),
            symbol
        );
        self.cache.put(symbol, timeframe, series.clone());
        Ok(series)
    }

    fn record_hit(&self) {
        if let Some(ref metrics) = self.metrics {
            metrics.candle_cache_hits_total.inc();
        }
    }

    fn record_miss(&self) {
        if let Some(ref metrics) = self.metrics {
            metrics.candle_cache_misses_total.inc();
        }
    }
}
