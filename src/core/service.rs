//! Mover discovery facade composing prioritizer, fetcher, ranker and signals.

use std::sync::Arc;
use tracing::info;

use crate::cache::{CandleCache, VolatilityTracker};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::metrics::Metrics;
use crate::models::indicators::Timeframe;
use crate::models::mover::{AssetType, MarketMover};
use crate::movers::{PairPrioritizer, MoverRanker, MIN_RANKING_CANDLES};
use crate::services::{CandleDataSource, CandleFetcher};
use crate::signals::{
    EmaSignalEngine, RecommendationGenerator, LONG_TERM_MIN_CANDLES, SHORT_TERM_MIN_CANDLES,
};

pub const MAX_MOVERS: usize = 25;

/// Entry point for top-mover queries.
///
/// Each stage consumes the movers it is given and returns new records with
/// more fields set, so callers can run stages independently.
pub struct MoverService {
    fetcher: CandleFetcher,
    volatility: Arc<VolatilityTracker>,
    prioritizer: PairPrioritizer,
    ranker: MoverRanker,
    metrics: Option<Arc<Metrics>>,
}

impl MoverService {
    pub fn new(source: Arc<dyn CandleDataSource>, config: EngineConfig) -> Self {
        Self::with_components(
            source,
            Arc::new(CandleCache::new()),
            Arc::new(VolatilityTracker::new()),
            config,
        )
    }

    pub fn with_components(
        source: Arc<dyn CandleDataSource>,
        cache: Arc<CandleCache>,
        volatility: Arc<VolatilityTracker>,
        config: EngineConfig,
    ) -> Self {
        Self {
            fetcher: CandleFetcher::new(source, cache, &config),
            prioritizer: PairPrioritizer::new(config.volatility_history_window),
            ranker: MoverRanker::new(volatility.clone()),
            volatility,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.fetcher = self.fetcher.with_metrics(metrics.clone());
        self.metrics = Some(metrics);
        self
    }

    pub fn cache(&self) -> &Arc<CandleCache> {
        self.fetcher.cache()
    }

    pub fn volatility(&self) -> &Arc<VolatilityTracker> {
        &self.volatility
    }

    /// Rank the most volatile symbols of an asset class on `timeframe`.
    ///
    /// Symbols that cannot be fetched or lack data are left out; the call
    /// only fails for an out-of-range `count`.
    pub async fn get_top_movers(
        &self,
        asset_type: AssetType,
        count: usize,
        timeframe: Timeframe,
    ) -> Result<Vec<MarketMover>, EngineError> {
        if count == 0 || count > MAX_MOVERS {
            return Err(EngineError::InvalidCount {
                count,
                max: MAX_MOVERS,
            });
        }
        if let Some(ref metrics) = self.metrics {
            metrics.movers_requests_total.inc();
        }

        let history = self.volatility.snapshot();
        let candidates = self
            .prioritizer
            .select_candidates(asset_type, count, &history);
        let series = self
            .fetcher
            .fetch_batch(&candidates, timeframe, MIN_RANKING_CANDLES)
            .await;
        let movers = self
            .ranker
            .rank(&candidates, &series, timeframe, asset_type, count);

        info!(
            asset_type = %asset_type,
            timeframe = %timeframe,
            candidates = candidates.len(),
            fetched = series.len(),
            returned = movers.len(),
            "MoverService: ranked {} of {} candidates for {}",
            movers.len(),
            candidates.len(),
            asset_type
        );
        Ok(movers)
    }

    /// Annotate movers with EMA10/20 on `short_term` and EMA50 on `long_term`.
    pub async fn apply_ema_filters(
        &self,
        movers: Vec<MarketMover>,
        short_term: Timeframe,
        long_term: Timeframe,
    ) -> Vec<MarketMover> {
        let symbols: Vec<String> = movers.iter().map(|m| m.symbol.clone()).collect();
        let (short_series, long_series) = tokio::join!(
            self.fetcher
                .fetch_batch(&symbols, short_term, SHORT_TERM_MIN_CANDLES),
            self.fetcher
                .fetch_batch(&symbols, long_term, LONG_TERM_MIN_CANDLES),
        );

        movers
            .into_iter()
            .map(|mover| {
                let short = short_series.get(&mover.symbol);
                let long = long_series.get(&mover.symbol);
                EmaSignalEngine::annotate(mover, short, long)
            })
            .collect()
    }

    pub fn generate_recommendations(&self, movers: Vec<MarketMover>) -> Vec<MarketMover> {
        movers
            .into_iter()
            .map(RecommendationGenerator::annotate)
            .collect()
    }

    /// Top movers with EMA annotations and recommendations in one call.
    pub async fn get_movers_with_recommendations(
        &self,
        asset_type: AssetType,
        count: usize,
        timeframe: Timeframe,
        short_term: Timeframe,
        long_term: Timeframe,
    ) -> Result<Vec<MarketMover>, EngineError> {
        let movers = self.get_top_movers(asset_type, count, timeframe).await?;
        let movers = self.apply_ema_filters(movers, short_term, long_term).await;
        Ok(self.generate_recommendations(movers))
    }
}
