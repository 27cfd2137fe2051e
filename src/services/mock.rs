//! Scriptable in-memory candle source for tests, demos and outage drills.

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;

use super::market_data::CandleDataSource;
use crate::error::ProviderError;
use crate::models::indicators::{Candle, CandleSeries, Timeframe};
use crate::models::mover::AssetType;
use crate::movers::universe::{is_jpy_pair, universe};

#[derive(Default)]
struct Script {
    // (symbol, Some(tf)) is preferred over (symbol, None) when both exist.
    series: HashMap<(String, Option<Timeframe>), Vec<Candle>>,
    failures: HashMap<String, ProviderError>,
    delays: HashMap<String, Duration>,
    calls: HashMap<String, usize>,
}

pub struct MockCandleSource {
    script: RwLock<Script>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl MockCandleSource {
    pub fn new() -> Self {
        Self {
            script: RwLock::new(Script::default()),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        }
    }

    /// Serve `candles` for `symbol` on every timeframe without a specific series.
    pub async fn set_series(&self, symbol: &str, candles: Vec<Candle>) {
        let mut script = self.script.write().await;
        script.series.insert((symbol.to_string(), None), candles);
    }

    pub async fn set_series_for(&self, symbol: &str, timeframe: Timeframe, candles: Vec<Candle>) {
        let mut script = self.script.write().await;
        script
            .series
            .insert((symbol.to_string(), Some(timeframe)), candles);
    }

    pub async fn fail_symbol(&self, symbol: &str, error: ProviderError) {
        let mut script = self.script.write().await;
        script.failures.insert(symbol.to_string(), error);
    }

    pub async fn clear_failure(&self, symbol: &str) {
        let mut script = self.script.write().await;
        script.failures.remove(symbol);
    }

    /// Delay every fetch of `symbol`, e.g. to simulate a hung provider.
    pub async fn delay_symbol(&self, symbol: &str, delay: Duration) {
        let mut script = self.script.write().await;
        script.delays.insert(symbol.to_string(), delay);
    }

    pub async fn calls_for(&self, symbol: &str) -> usize {
        let script = self.script.read().await;
        script.calls.get(symbol).copied().unwrap_or(0)
    }

    pub async fn total_calls(&self) -> usize {
        let script = self.script.read().await;
        script.calls.values().sum()
    }

    /// Highest number of fetches observed running at the same time.
    pub fn peak_concurrency(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    /// A source pre-loaded with a seeded random walk for each symbol.
    pub async fn with_random_walks(symbols: &[(&str, Decimal)], count: usize, seed: u64) -> Self {
        let source = Self::new();
        let mut rng = StdRng::seed_from_u64(seed);
        for (symbol, base) in symbols {
            let walk_seed = rng.gen();
            source
                .set_series(symbol, random_walk(*base, count, walk_seed))
                .await;
        }
        source
    }

    /// Random walks over both symbol universes, used when no provider is configured.
    pub async fn demo(seed: u64) -> Self {
        let symbols: Vec<(&str, Decimal)> = universe(AssetType::Forex)
            .iter()
            .chain(universe(AssetType::Crypto))
            .map(|&symbol| (symbol, demo_base_price(symbol)))
            .collect();
        Self::with_random_walks(&symbols, DEMO_CANDLES, seed).await
    }
}

const DEMO_CANDLES: usize = 120;

fn demo_base_price(symbol: &str) -> Decimal {
    match symbol {
        "BTCUSD" => dec!(65000),
        "ETHUSD" => dec!(3200),
        "SOLUSD" | "LTCUSD" | "BCHUSD" | "AVAXUSD" => dec!(150),
        s if universe(AssetType::Crypto).contains(&s) => dec!(0.75),
        s if is_jpy_pair(s) => dec!(150.250),
        _ => dec!(1.25000),
    }
}

impl Default for MockCandleSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CandleDataSource for MockCandleSource {
    async fn fetch(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        count: usize,
    ) -> Result<CandleSeries, ProviderError> {
        let (delay, failure, candles) = {
            let mut script = self.script.write().await;
            *script.calls.entry(symbol.to_string()).or_insert(0) += 1;
            let candles = script
                .series
                .get(&(symbol.to_string(), Some(timeframe)))
                .or_else(|| script.series.get(&(symbol.to_string(), None)))
                .cloned();
            (
                script.delays.get(symbol).copied(),
                script.failures.get(symbol).cloned(),
                candles,
            )
        };

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(current, Ordering::SeqCst);

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if let Some(error) = failure {
            return Err(error);
        }

        let candles = candles.ok_or_else(|| ProviderError::SymbolNotFound {
            symbol: symbol.to_string(),
        })?;
        let start = candles.len().saturating_sub(count);
        Ok(CandleSeries::from_candles(candles[start..].to_vec()))
    }

    fn name(&self) -> &str {
        "mock"
    }
}

fn epoch() -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

/// Candles from a list of closes, one hour apart. Open is the prior close and
/// the range spans open and close.
pub fn candles_from_closes(closes: &[Decimal]) -> Vec<Candle> {
    let start = epoch();
    let mut previous = closes.first().copied().unwrap_or_default();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = previous;
            previous = close;
            Candle::new(
                open,
                open.max(close),
                open.min(close),
                close,
                Decimal::ONE_THOUSAND,
                start + ChronoDuration::hours(i as i64),
            )
        })
        .collect()
}

/// Flat series at `price`.
pub fn flat_candles(price: Decimal, count: usize) -> Vec<Candle> {
    candles_from_closes(&vec![price; count])
}

/// Seeded random walk with steps of up to 0.2% of `base`.
pub fn random_walk(base: Decimal, count: usize, seed: u64) -> Vec<Candle> {
    let mut rng = StdRng::seed_from_u64(seed);
    let step = base * Decimal::new(2, 3);
    let mut price = base;
    let closes: Vec<Decimal> = (0..count)
        .map(|_| {
            let bps: i64 = rng.gen_range(-100..=100);
            price += step * Decimal::new(bps, 2);
            price
        })
        .collect();
    candles_from_closes(&closes)
}
