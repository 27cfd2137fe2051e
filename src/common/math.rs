//! Decimal math helpers shared by the indicators.

use rust_decimal::Decimal;

/// Simple average of the first `period` values.
pub fn sma(values: &[Decimal], period: usize) -> Option<Decimal> {
    if period == 0 || values.len() < period {
        return None;
    }
    let sum: Decimal = values[..period].iter().copied().sum();
    Some(sum / Decimal::from(period as u64))
}

/// Exponential moving average of `values`, returning the final value.
///
/// Seeded with the SMA of the first `period` values, then
/// `ema = (value - ema) * m + ema` with `m = 2 / (period + 1)`.
pub fn ema(values: &[Decimal], period: usize) -> Option<Decimal> {
    let seed = sma(values, period)?;
    let multiplier = Decimal::TWO / Decimal::from(period as u64 + 1);
    let ema = values[period..]
        .iter()
        .fold(seed, |ema, &value| (value - ema) * multiplier + ema);
    Some(ema)
}

/// `|value / reference - 1|`, or `None` when the reference is zero.
pub fn relative_distance(value: Decimal, reference: Decimal) -> Option<Decimal> {
    let ratio = value.checked_div(reference)?;
    Some((ratio - Decimal::ONE).abs())
}
