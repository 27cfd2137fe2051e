//! Environment-driven configuration.

use std::env;
use std::time::Duration;

/// Minimum candles fetched per request so a cached series can serve EMA50.
pub const MIN_FETCH_CANDLES: usize = 51;

pub fn get_environment() -> String {
    env::var("ENVIRONMENT").unwrap_or_else(|_| "sandbox".to_string())
}

/// Base URL of the REST candle provider, if one is configured.
pub fn get_candle_api_url() -> Option<String> {
    env::var("CANDLE_API_URL").ok().filter(|url| !url.trim().is_empty())
}

pub fn get_port() -> u16 {
    env_parse("PORT").unwrap_or(8080)
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

/// Tunables for the fetch coordinator and prioritizer.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Upper bound on concurrent provider fetches per batch.
    pub max_concurrent_fetches: usize,
    pub fetch_timeout: Duration,
    /// Candles requested from the provider on a cache miss.
    pub fetch_candle_count: usize,
    /// Volatility samples older than this are ignored by the prioritizer.
    pub volatility_history_window: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: 8,
            fetch_timeout: Duration::from_secs(10),
            fetch_candle_count: 100,
            volatility_history_window: Duration::from_secs(24 * 60 * 60),
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_concurrent_fetches: env_parse("MAX_CONCURRENT_FETCHES")
                .unwrap_or(defaults.max_concurrent_fetches)
                .clamp(1, 32),
            fetch_timeout: env_parse("FETCH_TIMEOUT_SECONDS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.fetch_timeout),
            fetch_candle_count: env_parse::<usize>("FETCH_CANDLE_COUNT")
                .unwrap_or(defaults.fetch_candle_count)
                .max(MIN_FETCH_CANDLES),
            volatility_history_window: env_parse::<u64>("VOLATILITY_HISTORY_HOURS")
                .map(|h| Duration::from_secs(h * 60 * 60))
                .unwrap_or(defaults.volatility_history_window),
        }
    }

    pub fn with_max_concurrent_fetches(mut self, limit: usize) -> Self {
        self.max_concurrent_fetches = limit.max(1);
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }
}
