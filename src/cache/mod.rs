//! In-process caches shared across concurrent requests.

pub mod candles;
pub mod volatility;

pub use candles::{CacheEntry, CacheKey, CandleCache};
pub use volatility::{VolatilitySample, VolatilityTracker};
