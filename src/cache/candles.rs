//! Candle series cache keyed by (symbol, timeframe) with per-timeframe TTL.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::models::indicators::{CandleSeries, Timeframe};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub symbol: String,
    pub timeframe: Timeframe,
}

impl CacheKey {
    pub fn new(symbol: &str, timeframe: Timeframe) -> Self {
        Self {
            symbol: symbol.to_string(),
            timeframe,
        }
    }
}

/// A fetched series and when it was fetched. Replaced wholesale on refresh.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub series: CandleSeries,
    pub fetched_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn is_fresh_at(&self, timeframe: Timeframe, now: DateTime<Utc>) -> bool {
        let ttl = chrono::Duration::seconds(timeframe.ttl().as_secs() as i64);
        now.signed_duration_since(self.fetched_at) < ttl
    }
}

/// Concurrent candle cache.
///
/// Entries live in a sharded map so unrelated keys never contend. Each key
/// also owns a refresh lock: fetchers take it before going to the provider
/// and re-check the cache once they hold it, which keeps at most one refresh
/// in flight per key. The cache itself never fetches.
#[derive(Default)]
pub struct CandleCache {
    entries: DashMap<CacheKey, CacheEntry>,
    refresh_locks: DashMap<CacheKey, Arc<Mutex<()>>>,
}

impl CandleCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, symbol: &str, timeframe: Timeframe) -> Option<CandleSeries> {
        self.get_at(symbol, timeframe, Utc::now())
    }

    /// Lookup as of `now`; absent and expired entries are both a miss.
    pub fn get_at(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        now: DateTime<Utc>,
    ) -> Option<CandleSeries> {
        let entry = self.entries.get(&CacheKey::new(symbol, timeframe))?;
        if entry.is_fresh_at(timeframe, now) {
            Some(entry.series.clone())
        } else {
            None
        }
    }

    pub fn put(&self, symbol: &str, timeframe: Timeframe, series: CandleSeries) {
        self.put_at(symbol, timeframe, series, Utc::now());
    }

    pub fn put_at(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        series: CandleSeries,
        fetched_at: DateTime<Utc>,
    ) {
        self.entries.insert(
            CacheKey::new(symbol, timeframe),
            CacheEntry { series, fetched_at },
        );
    }

    /// The refresh lock for one key, created on first use.
    pub fn refresh_lock(&self, symbol: &str, timeframe: Timeframe) -> Arc<Mutex<()>> {
        self.refresh_locks
            .entry(CacheKey::new(symbol, timeframe))
            .or_default()
            .value()
            .clone()
    }

    /// Drop expired entries, returning how many were removed.
    ///
    /// Refresh locks for keys without an entry are dropped too, unless a
    /// fetcher still holds a handle to them.
    pub fn purge_expired(&self) -> usize {
        self.purge_expired_at(Utc::now())
    }

    pub fn purge_expired_at(&self, now: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|key, entry| entry.is_fresh_at(key.timeframe, now));
        self.refresh_locks
            .retain(|key, lock| self.entries.contains_key(key) || Arc::strong_count(lock) > 1);
        before - self.entries.len()
    }

    pub fn refresh_lock_count(&self) -> usize {
        self.refresh_locks.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
