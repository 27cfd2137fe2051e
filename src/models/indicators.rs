use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

impl Candle {
    pub fn new(
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
        volume: Decimal,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

/// Bar width supported by the candle sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "5m")]
    Minutes5,
    #[serde(rename = "15m")]
    Minutes15,
    #[serde(rename = "1h")]
    Hours1,
    #[serde(rename = "4h")]
    Hours4,
    #[serde(rename = "1d")]
    Days1,
}

impl Timeframe {
    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::Minutes5 => "5m",
            Timeframe::Minutes15 => "15m",
            Timeframe::Hours1 => "1h",
            Timeframe::Hours4 => "4h",
            Timeframe::Days1 => "1d",
        }
    }

    /// How long a cached series for this timeframe stays fresh (one bar).
    pub fn ttl(&self) -> Duration {
        let minutes = match self {
            Timeframe::Minutes5 => 5,
            Timeframe::Minutes15 => 15,
            Timeframe::Hours1 => 60,
            Timeframe::Hours4 => 240,
            Timeframe::Days1 => 1440,
        };
        Duration::from_secs(minutes * 60)
    }

    /// Parse a timeframe label, falling back to one hour for anything unknown.
    pub fn parse_lenient(label: &str) -> Self {
        label.parse().unwrap_or_else(|_| {
            tracing::warn!(label = %label, "Unknown timeframe '{}', defaulting to 1h", label);
            Timeframe::Hours1
        })
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "5m" | "m5" | "minutes5" => Ok(Timeframe::Minutes5),
            "15m" | "m15" | "minutes15" => Ok(Timeframe::Minutes15),
            "1h" | "h1" | "hours1" => Ok(Timeframe::Hours1),
            "4h" | "h4" | "hours4" => Ok(Timeframe::Hours4),
            "1d" | "d1" | "days1" => Ok(Timeframe::Days1),
            other => Err(format!("unknown timeframe: {}", other)),
        }
    }
}

/// Immutable, shareable candle series ordered by ascending timestamp.
///
/// Cloning is cheap and never exposes the underlying buffer mutably, so a
/// cache refresh can swap in a new series while readers keep the old one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandleSeries(Arc<[Candle]>);

impl CandleSeries {
    /// Build a series, sorting by timestamp and dropping duplicate timestamps
    /// (the last candle seen for a timestamp wins).
    pub fn from_candles(mut candles: Vec<Candle>) -> Self {
        candles.sort_by_key(|c| c.timestamp);
        let mut deduped: Vec<Candle> = Vec::with_capacity(candles.len());
        for candle in candles {
            match deduped.last_mut() {
                Some(last) if last.timestamp == candle.timestamp => *last = candle,
                _ => deduped.push(candle),
            }
        }
        Self(deduped.into())
    }

    pub fn closes(&self) -> Vec<Decimal> {
        self.0.iter().map(|c| c.close).collect()
    }

    pub fn last_close(&self) -> Option<Decimal> {
        self.0.last().map(|c| c.close)
    }

    /// The last `n` candles (or all of them if the series is shorter).
    pub fn tail(&self, n: usize) -> &[Candle] {
        let start = self.0.len().saturating_sub(n);
        &self.0[start..]
    }
}

impl Deref for CandleSeries {
    type Target = [Candle];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<Candle>> for CandleSeries {
    fn from(candles: Vec<Candle>) -> Self {
        Self::from_candles(candles)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmaIndicator {
    pub value: Decimal,
    pub period: u32,
}
