//! Last observed movement per symbol, used to bias candidate selection.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolatilitySample {
    pub symbol: String,
    pub abs_movement: Decimal,
    pub observed_at: DateTime<Utc>,
}

/// Losing this table only degrades sampling quality, never correctness.
#[derive(Default)]
pub struct VolatilityTracker {
    samples: DashMap<String, VolatilitySample>,
}

impl VolatilityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, symbol: &str, movement: Decimal) {
        self.record_at(symbol, movement, Utc::now());
    }

    pub fn record_at(&self, symbol: &str, movement: Decimal, observed_at: DateTime<Utc>) {
        self.samples.insert(
            symbol.to_string(),
            VolatilitySample {
                symbol: symbol.to_string(),
                abs_movement: movement.abs(),
                observed_at,
            },
        );
    }

    pub fn get(&self, symbol: &str) -> Option<VolatilitySample> {
        self.samples.get(symbol).map(|s| s.value().clone())
    }

    pub fn snapshot(&self) -> Vec<VolatilitySample> {
        self.samples.iter().map(|s| s.value().clone()).collect()
    }

    pub fn clear(&self) {
        self.samples.clear();
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
