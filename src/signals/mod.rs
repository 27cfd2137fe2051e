//! EMA signal evaluation and trade recommendations.

pub mod engine;
pub mod recommendation;

pub use engine::{
    EmaSignalEngine, BOUNCE_THRESHOLD, BREAKOUT_LOOKBACK, LONG_TERM_MIN_CANDLES,
    SHORT_TERM_MIN_CANDLES,
};
pub use recommendation::{infer_direction, select_order_type, RecommendationGenerator, RiskProfile};
