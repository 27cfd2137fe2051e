//! Unit tests for movement ranking

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::sync::Arc;
use swingscan::cache::VolatilityTracker;
use swingscan::models::indicators::{CandleSeries, Timeframe};
use swingscan::models::mover::{AssetType, MoveDirection};
use swingscan::movers::{movement, MoverRanker};
use swingscan::services::mock::candles_from_closes;

fn series(closes: &[Decimal]) -> CandleSeries {
    CandleSeries::from_candles(candles_from_closes(closes))
}

fn symbols(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_forex_movement_in_pips() {
    assert_eq!(
        movement(AssetType::Forex, "EURUSD", dec!(1.1050), dec!(1.1000)),
        dec!(50)
    );
    assert_eq!(
        movement(AssetType::Forex, "USDJPY", dec!(150.25), dec!(150.00)),
        dec!(25)
    );
}

#[test]
fn test_crypto_movement_is_raw_delta() {
    assert_eq!(
        movement(AssetType::Crypto, "BTCUSD", dec!(60150), dec!(60000)),
        dec!(150)
    );
}

#[test]
fn test_rank_orders_by_absolute_movement_and_truncates() {
    let tracker = Arc::new(VolatilityTracker::new());
    let ranker = MoverRanker::new(tracker.clone());
    let data = HashMap::from([
        ("EURUSD".to_string(), series(&[dec!(1.1000), dec!(1.1010)])),
        ("GBPUSD".to_string(), series(&[dec!(1.2500), dec!(1.2450)])),
        ("AUDUSD".to_string(), series(&[dec!(0.6500), dec!(0.6530)])),
    ]);

    let movers = ranker.rank(
        &symbols(&["EURUSD", "GBPUSD", "AUDUSD"]),
        &data,
        Timeframe::Hours1,
        AssetType::Forex,
        2,
    );

    let ranked: Vec<&str> = movers.iter().map(|m| m.symbol.as_str()).collect();
    assert_eq!(ranked, vec!["GBPUSD", "AUDUSD"]);
    assert_eq!(movers[0].movement, dec!(-50));
    assert_eq!(movers[0].direction, MoveDirection::Down);
    assert_eq!(movers[1].direction, MoveDirection::Up);

    // Truncated symbols still feed the volatility table.
    assert_eq!(tracker.len(), 3);
    assert_eq!(tracker.get("EURUSD").unwrap().abs_movement, dec!(10));
}

#[test]
fn test_zero_movement_is_down() {
    let ranker = MoverRanker::new(Arc::new(VolatilityTracker::new()));
    let data = HashMap::from([("EURUSD".to_string(), series(&[dec!(1.1), dec!(1.1)]))]);

    let movers = ranker.rank(
        &symbols(&["EURUSD"]),
        &data,
        Timeframe::Hours1,
        AssetType::Forex,
        5,
    );
    assert_eq!(movers[0].movement, Decimal::ZERO);
    assert_eq!(movers[0].direction, MoveDirection::Down);
}

#[test]
fn test_symbols_without_enough_data_are_dropped() {
    let ranker = MoverRanker::new(Arc::new(VolatilityTracker::new()));
    let data = HashMap::from([
        ("EURUSD".to_string(), series(&[dec!(1.1)])),
        ("GBPUSD".to_string(), series(&[dec!(1.25), dec!(1.26)])),
    ]);

    let movers = ranker.rank(
        &symbols(&["EURUSD", "GBPUSD", "USDJPY"]),
        &data,
        Timeframe::Hours1,
        AssetType::Forex,
        5,
    );
    assert_eq!(movers.len(), 1);
    assert_eq!(movers[0].symbol, "GBPUSD");
    assert_eq!(movers[0].current_price, dec!(1.26));
    assert_eq!(movers[0].previous_price, dec!(1.25));
}

#[test]
fn test_movement_uses_two_most_recent_candles() {
    let ranker = MoverRanker::new(Arc::new(VolatilityTracker::new()));
    let data = HashMap::from([(
        "BTCUSD".to_string(),
        series(&[dec!(50000), dec!(59000), dec!(60000), dec!(60100)]),
    )]);

    let movers = ranker.rank(
        &symbols(&["BTCUSD"]),
        &data,
        Timeframe::Hours4,
        AssetType::Crypto,
        1,
    );
    assert_eq!(movers[0].movement, dec!(100));
    assert_eq!(movers[0].timeframe, Timeframe::Hours4);
}
