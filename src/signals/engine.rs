//! EMA signal evaluation for ranked movers.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::BTreeMap;
use tracing::warn;

use crate::common::math::relative_distance;
use crate::error::InsufficientDataError;
use crate::indicators::trend::{
    calculate_ema, calculate_previous_ema, classify_cross, is_breaking_through, EmaCross,
};
use crate::models::indicators::CandleSeries;
use crate::models::mover::{EmaStatus, MarketMover};

/// Short-term candles needed for a meaningful EMA20 and its previous value.
pub const SHORT_TERM_MIN_CANDLES: usize = 21;
/// Long-term candles needed for EMA50.
pub const LONG_TERM_MIN_CANDLES: usize = 51;
/// Price within 0.1% of an EMA counts as a bounce.
pub const BOUNCE_THRESHOLD: Decimal = dec!(0.001);
/// Candles inspected for a breakout.
pub const BREAKOUT_LOOKBACK: usize = 3;

pub struct EmaSignalEngine;

impl EmaSignalEngine {
    /// Annotate a mover with EMA10/20 from `short_term` and EMA50 from
    /// `long_term`.
    ///
    /// Too little short-term data leaves the mover untouched; too little
    /// long-term data only skips EMA50 and its flags.
    pub fn annotate(
        mover: MarketMover,
        short_term: Option<&CandleSeries>,
        long_term: Option<&CandleSeries>,
    ) -> MarketMover {
        match Self::evaluate(&mover, short_term, long_term) {
            Some((values, status)) => mover.with_ema(values, status),
            None => mover,
        }
    }

    pub fn evaluate(
        mover: &MarketMover,
        short_term: Option<&CandleSeries>,
        long_term: Option<&CandleSeries>,
    ) -> Option<(BTreeMap<u32, Decimal>, EmaStatus)> {
        let short = match short_term {
            Some(series) if series.len() >= SHORT_TERM_MIN_CANDLES => series,
            other => {
                let e = InsufficientDataError {
                    symbol: mover.symbol.clone(),
                    stage: "ema-short-term",
                    required: SHORT_TERM_MIN_CANDLES,
                    available: other.map(|s| s.len()).unwrap_or(0),
                };
                warn!(
                    symbol = %mover.symbol,
                    stage = e.stage,
                    error = %e,
                    "EmaSignalEngine: skipping EMA annotation for {}",
                    mover.symbol
                );
                return None;
            }
        };

        let price = mover.current_price;
        let ema10 = calculate_ema(short, 10)?.value;
        let ema20 = calculate_ema(short, 20)?.value;
        let prev_ema10 = calculate_previous_ema(short, 10)?.value;
        let prev_ema20 = calculate_previous_ema(short, 20)?.value;

        let cross = classify_cross(prev_ema10, prev_ema20, ema10, ema20);
        let mut status = EmaStatus {
            is_above_ema10: price > ema10,
            is_above_ema20: price > ema20,
            is_ema10_crossing_above_ema20: cross == EmaCross::CrossingAbove,
            is_ema10_crossing_below_ema20: cross == EmaCross::CrossingBelow,
            is_bouncing_off_ema10: is_bouncing(price, ema10),
            is_bouncing_off_ema20: is_bouncing(price, ema20),
            is_breaking_through_ema10: is_breaking_through(short, ema10, BREAKOUT_LOOKBACK),
            is_breaking_through_ema20: is_breaking_through(short, ema20, BREAKOUT_LOOKBACK),
            ..EmaStatus::default()
        };

        let mut values = BTreeMap::from([(10, ema10), (20, ema20)]);

        match long_term {
            Some(long) if long.len() >= LONG_TERM_MIN_CANDLES => {
                if let Some(ema50) = calculate_ema(long, 50).map(|e| e.value) {
                    status.is_above_ema50 = price > ema50;
                    status.is_bouncing_off_ema50 = is_bouncing(price, ema50);
                    status.is_breaking_through_ema50 =
                        is_breaking_through(long, ema50, BREAKOUT_LOOKBACK);
                    values.insert(50, ema50);
                }
            }
            other => {
                let e = InsufficientDataError {
                    symbol: mover.symbol.clone(),
                    stage: "ema-long-term",
                    required: LONG_TERM_MIN_CANDLES,
                    available: other.map(|s| s.len()).unwrap_or(0),
                };
                warn!(
                    symbol = %mover.symbol,
                    stage = e.stage,
                    error = %e,
                    "EmaSignalEngine: skipping EMA50 for {}",
                    mover.symbol
                );
            }
        }

        Some((values, status))
    }
}

fn is_bouncing(price: Decimal, ema: Decimal) -> bool {
    relative_distance(price, ema)
        .map(|distance| distance < BOUNCE_THRESHOLD)
        .unwrap_or(false)
}
