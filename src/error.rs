//! Error taxonomy for the mover engine.
//!
//! Only [`EngineError`] ever reaches a caller, and only for request validation.
//! The other kinds are recovered where they happen and logged.

use thiserror::Error;

/// A single symbol's fetch failed. Treated uniformly as "no data this round".
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProviderError {
    #[error("rate limited by provider")]
    RateLimited,

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("malformed response: {message}")]
    MalformedResponse { message: String },

    #[error("transport failure: {message}")]
    Transport { message: String },

    #[error("fetch timed out after {millis}ms")]
    Timeout { millis: u64 },
}

impl ProviderError {
    /// Whether a retry has a reasonable chance of succeeding.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ProviderError::RateLimited | ProviderError::Transport { .. })
    }
}

/// Fewer candles than a computation needs.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("{stage}: {symbol} has {available} candles, {required} required")]
pub struct InsufficientDataError {
    pub symbol: String,
    pub stage: &'static str,
    pub required: usize,
    pub available: usize,
}

/// Unexpected numeric failure while deriving a recommendation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ComputationError {
    #[error("EMA{period} unavailable")]
    MissingEma { period: u32 },

    #[error("division by zero in {context}")]
    DivisionByZero { context: &'static str },

    #[error("non-positive entry price {price}")]
    NonPositivePrice { price: String },
}

/// Request-level validation failure at the query surface.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    #[error("invalid asset class: {0}")]
    InvalidAssetClass(String),

    #[error("count must be between 1 and {max}, got {count}")]
    InvalidCount { count: usize, max: usize },
}
