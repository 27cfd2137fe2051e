//! Shared data models spanning the engine layers.

pub mod indicators;
pub mod mover;
pub mod signal;

pub use indicators::{Candle, CandleSeries, EmaIndicator, Timeframe};
pub use mover::{AssetType, EmaStatus, MarketMover, MoveDirection};
pub use signal::{OrderType, TradeDirection, TradeRecommendation};
