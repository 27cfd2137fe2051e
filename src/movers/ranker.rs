//! Movement computation and ranking.

use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

use super::universe::pip_multiplier;
use crate::cache::VolatilityTracker;
use crate::error::InsufficientDataError;
use crate::models::indicators::{CandleSeries, Timeframe};
use crate::models::mover::{AssetType, MarketMover};

pub const MIN_RANKING_CANDLES: usize = 2;

/// Pips for forex, raw price delta for crypto.
pub fn movement(asset_type: AssetType, symbol: &str, current: Decimal, previous: Decimal) -> Decimal {
    let delta = current - previous;
    match asset_type {
        AssetType::Forex => delta * pip_multiplier(symbol),
        AssetType::Crypto => delta,
    }
}

pub struct MoverRanker {
    volatility: Arc<VolatilityTracker>,
}

impl MoverRanker {
    pub fn new(volatility: Arc<VolatilityTracker>) -> Self {
        Self { volatility }
    }

    /// Build one mover per symbol with enough data, sorted by `|movement|`
    /// descending and truncated to `count`.
    ///
    /// Every ranked symbol feeds the volatility table, including those cut by
    /// the truncation.
    pub fn rank(
        &self,
        symbols: &[String],
        series: &HashMap<String, CandleSeries>,
        timeframe: Timeframe,
        asset_type: AssetType,
        count: usize,
    ) -> Vec<MarketMover> {
        let mut movers: Vec<MarketMover> = symbols
            .iter()
            .filter_map(|symbol| {
                let candles = series.get(symbol)?;
                match self.build(symbol, candles, timeframe, asset_type) {
                    Ok(mover) => Some(mover),
                    Err(e) => {
                        warn!(
                            symbol = %symbol,
                            timeframe = %timeframe,
                            stage = e.stage,
                            error = %e,
                            "MoverRanker: skipping {}",
                            symbol
                        );
                        None
                    }
                }
            })
            .collect();

        for mover in &movers {
            self.volatility.record(&mover.symbol, mover.movement);
        }

        movers.sort_by(|a, b| {
            b.movement
                .abs()
                .cmp(&a.movement.abs())
                .then_with(|| a.symbol.cmp(&b.symbol))
        });
        movers.truncate(count);
        movers
    }

    fn build(
        &self,
        symbol: &str,
        candles: &CandleSeries,
        timeframe: Timeframe,
        asset_type: AssetType,
    ) -> Result<MarketMover, InsufficientDataError> {
        let tail = candles.tail(MIN_RANKING_CANDLES);
        let [previous, current] = tail else {
            return Err(InsufficientDataError {
                symbol: symbol.to_string(),
                stage: "rank",
                required: MIN_RANKING_CANDLES,
                available: candles.len(),
            });
        };

        Ok(MarketMover::new(
            symbol.to_string(),
            asset_type,
            timeframe,
            current.close,
            previous.close,
            movement(asset_type, symbol, current.close, previous.close),
        ))
    }
}
