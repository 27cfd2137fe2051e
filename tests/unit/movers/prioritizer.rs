//! Unit tests for candidate selection

use chrono::{Duration, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashSet;
use std::time::Duration as StdDuration;
use swingscan::cache::VolatilitySample;
use swingscan::models::mover::AssetType;
use swingscan::movers::universe::{universe, COMMON_CRYPTO_PAIRS, COMMON_FOREX_PAIRS};
use swingscan::movers::PairPrioritizer;

fn prioritizer() -> PairPrioritizer {
    PairPrioritizer::new(StdDuration::from_secs(24 * 60 * 60))
}

fn sample(symbol: &str, movement: Decimal, hours_ago: i64) -> VolatilitySample {
    VolatilitySample {
        symbol: symbol.to_string(),
        abs_movement: movement,
        observed_at: Utc::now() - Duration::hours(hours_ago),
    }
}

fn select(asset_type: AssetType, requested: usize, history: &[VolatilitySample]) -> Vec<String> {
    let mut rng = StdRng::seed_from_u64(7);
    prioritizer().select_candidates_with_rng(asset_type, requested, history, Utc::now(), &mut rng)
}

fn assert_unique_members(asset_type: AssetType, candidates: &[String]) {
    let unique: HashSet<&String> = candidates.iter().collect();
    assert_eq!(unique.len(), candidates.len(), "duplicate candidates: {:?}", candidates);
    for symbol in candidates {
        assert!(universe(asset_type).contains(&symbol.as_str()));
    }
}

#[test]
fn test_target_count() {
    assert_eq!(PairPrioritizer::target_count(AssetType::Forex, 3), 10);
    assert_eq!(PairPrioritizer::target_count(AssetType::Forex, 8), 16);
    assert_eq!(PairPrioritizer::target_count(AssetType::Forex, 20), 25);
    assert_eq!(PairPrioritizer::target_count(AssetType::Crypto, 2), 8);
    assert_eq!(PairPrioritizer::target_count(AssetType::Crypto, 10), 15);
}

#[test]
fn test_cold_start_seeds_common_forex_pairs() {
    let candidates = select(AssetType::Forex, 3, &[]);
    assert_eq!(candidates.len(), 10);
    assert_eq!(&candidates[..COMMON_FOREX_PAIRS.len()], &COMMON_FOREX_PAIRS[..]);
    assert_unique_members(AssetType::Forex, &candidates);
}

#[test]
fn test_cold_start_seeds_common_crypto_pairs() {
    let candidates = select(AssetType::Crypto, 1, &[]);
    assert_eq!(candidates.len(), 8);
    assert_eq!(&candidates[..COMMON_CRYPTO_PAIRS.len()], &COMMON_CRYPTO_PAIRS[..]);
    assert_unique_members(AssetType::Crypto, &candidates);
}

#[test]
fn test_large_request_covers_whole_universe() {
    let candidates = select(AssetType::Forex, 25, &[]);
    assert_eq!(candidates.len(), universe(AssetType::Forex).len());
    assert_unique_members(AssetType::Forex, &candidates);
}

#[test]
fn test_warm_start_orders_by_recent_movement() {
    let history = vec![
        sample("EURUSD", dec!(20), 1),
        sample("GBPJPY", dec!(80), 2),
        sample("AUDNZD", dec!(50), 3),
    ];
    let candidates = select(AssetType::Forex, 3, &history);
    assert_eq!(candidates.len(), 10);
    assert_eq!(&candidates[..3], &["GBPJPY", "AUDNZD", "EURUSD"]);
    assert_unique_members(AssetType::Forex, &candidates);
}

#[test]
fn test_warm_start_truncates_to_target() {
    let history: Vec<VolatilitySample> = universe(AssetType::Forex)
        .iter()
        .enumerate()
        .map(|(i, symbol)| sample(symbol, Decimal::from(i as u64), 1))
        .collect();
    let candidates = select(AssetType::Forex, 3, &history);

    let expected: Vec<String> = universe(AssetType::Forex)
        .iter()
        .rev()
        .take(10)
        .map(|s| s.to_string())
        .collect();
    assert_eq!(candidates, expected);
}

#[test]
fn test_stale_history_falls_back_to_cold_start() {
    let history = vec![sample("GBPJPY", dec!(80), 30)];
    let candidates = select(AssetType::Forex, 3, &history);
    assert_eq!(&candidates[..COMMON_FOREX_PAIRS.len()], &COMMON_FOREX_PAIRS[..]);
}

#[test]
fn test_history_outside_universe_is_ignored() {
    let history = vec![sample("BTCUSD", dec!(900), 1)];
    let candidates = select(AssetType::Forex, 3, &history);
    assert!(!candidates.contains(&"BTCUSD".to_string()));
    assert_eq!(&candidates[..COMMON_FOREX_PAIRS.len()], &COMMON_FOREX_PAIRS[..]);
}

#[test]
fn test_select_candidates_with_thread_rng() {
    let candidates = prioritizer().select_candidates(AssetType::Crypto, 5, &[]);
    assert_eq!(candidates.len(), 10);
    assert_unique_members(AssetType::Crypto, &candidates);
}
