//! EMA (Exponential Moving Average) indicator

use crate::common::math;
use crate::models::indicators::{Candle, EmaIndicator};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Direction of a fast/slow EMA crossover on the most recent candle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmaCross {
    CrossingAbove,
    CrossingBelow,
    NoCross,
}

/// Calculate EMA for a specific period
pub fn calculate_ema(candles: &[Candle], period: u32) -> Option<EmaIndicator> {
    if period == 0 || candles.len() < period as usize {
        return None;
    }

    let closes: Vec<_> = candles.iter().map(|c| c.close).collect();
    let value = math::ema(&closes, period as usize)?;

    Some(EmaIndicator { value, period })
}

/// Calculate multiple EMAs at once
pub fn calculate_emas(candles: &[Candle], periods: &[u32]) -> Vec<EmaIndicator> {
    periods
        .iter()
        .filter_map(|&period| calculate_ema(candles, period))
        .collect()
}

/// EMA over the series with the most recent candle excluded.
pub fn calculate_previous_ema(candles: &[Candle], period: u32) -> Option<EmaIndicator> {
    let (_, previous) = candles.split_last()?;
    calculate_ema(previous, period)
}

/// Check whether the fast EMA crossed the slow EMA on the latest candle.
///
/// A cross above needs `prev_fast <= prev_slow` and `fast > slow`; a cross
/// below is the mirror. Returns `None` if either window is too short.
pub fn check_ema_cross(candles: &[Candle], fast_period: u32, slow_period: u32) -> Option<EmaCross> {
    let fast = calculate_ema(candles, fast_period)?;
    let slow = calculate_ema(candles, slow_period)?;
    let prev_fast = calculate_previous_ema(candles, fast_period)?;
    let prev_slow = calculate_previous_ema(candles, slow_period)?;

    Some(classify_cross(prev_fast.value, prev_slow.value, fast.value, slow.value))
}

pub fn classify_cross(
    prev_fast: Decimal,
    prev_slow: Decimal,
    fast: Decimal,
    slow: Decimal,
) -> EmaCross {
    if prev_fast <= prev_slow && fast > slow {
        EmaCross::CrossingAbove
    } else if prev_fast >= prev_slow && fast < slow {
        EmaCross::CrossingBelow
    } else {
        EmaCross::NoCross
    }
}

/// True if any of the last `lookback` candles straddled `ema` and closed on
/// the opposite side of the range extreme that sat beyond it.
pub fn is_breaking_through(candles: &[Candle], ema: Decimal, lookback: usize) -> bool {
    let start = candles.len().saturating_sub(lookback);
    candles[start..].iter().any(|c| {
        (c.low < ema && c.close > ema) || (c.high > ema && c.close < ema)
    })
}
