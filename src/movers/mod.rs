//! Candidate selection and movement ranking.

pub mod prioritizer;
pub mod ranker;
pub mod universe;

pub use prioritizer::PairPrioritizer;
pub use ranker::{movement, MoverRanker, MIN_RANKING_CANDLES};
pub use universe::{is_jpy_pair, pip_multiplier, pip_size};
