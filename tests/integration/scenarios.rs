//! Integration tests for market scenarios

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::time::Duration;
use swingscan::config::EngineConfig;
use swingscan::core::MoverService;
use swingscan::error::ProviderError;
use swingscan::models::indicators::Timeframe;
use swingscan::models::mover::{AssetType, MoveDirection};
use swingscan::models::signal::{OrderType, TradeDirection};
use swingscan::movers::universe::{universe, COMMON_FOREX_PAIRS};
use swingscan::services::mock::{candles_from_closes, flat_candles, random_walk};
use swingscan::services::MockCandleSource;

fn breakout_closes() -> Vec<Decimal> {
    let mut closes = vec![dec!(1.1000); 29];
    closes.push(dec!(1.1050));
    closes
}

#[tokio::test]
async fn eurusd_breakout_becomes_stop_buy() {
    let source = Arc::new(MockCandleSource::new());
    source
        .set_series("EURUSD", candles_from_closes(&breakout_closes()))
        .await;
    let service = MoverService::new(source, EngineConfig::default());

    let movers = service
        .get_top_movers(AssetType::Forex, 1, Timeframe::Hours1)
        .await
        .unwrap();
    assert_eq!(movers.len(), 1);
    let mover = &movers[0];
    assert_eq!(mover.symbol, "EURUSD");
    assert_eq!(mover.movement, dec!(50));
    assert_eq!(mover.direction, MoveDirection::Up);

    let movers = service
        .apply_ema_filters(movers, Timeframe::Hours1, Timeframe::Hours4)
        .await;
    let mover = &movers[0];
    assert!(mover.ema(10).is_some());
    assert!(mover.ema(20).is_some());
    // Thirty candles cannot support EMA50.
    assert!(mover.ema(50).is_none());
    assert!(mover.ema_status.is_ema10_crossing_above_ema20);
    assert!(mover.ema_status.is_above_ema10);

    let movers = service.generate_recommendations(movers);
    let trade = movers[0].recommended_trade.as_ref().unwrap();
    assert_eq!(trade.direction, TradeDirection::Buy);
    assert_eq!(trade.order_type, OrderType::StopBuy);
    assert_eq!(trade.entry_price, dec!(1.1050));
    assert!(trade.stop_loss_price < trade.entry_price);
    assert!(trade.take_profit_price > trade.entry_price);
    assert!(trade.entry_price - trade.stop_loss_price <= dec!(0.0100));
    assert!(trade.take_profit_price - trade.entry_price <= dec!(0.0300));
}

#[tokio::test]
async fn partial_outage_still_returns_healthy_symbols() {
    let source = Arc::new(MockCandleSource::new());
    for (i, symbol) in universe(AssetType::Forex).iter().enumerate() {
        source
            .set_series(symbol, random_walk(dec!(1.2), 30, i as u64))
            .await;
    }
    source.fail_symbol("EURUSD", ProviderError::RateLimited).await;
    source
        .fail_symbol(
            "GBPUSD",
            ProviderError::MalformedResponse {
                message: "truncated body".to_string(),
            },
        )
        .await;
    source
        .delay_symbol("USDJPY", Duration::from_millis(300))
        .await;
    let config = EngineConfig::default().with_fetch_timeout(Duration::from_millis(50));
    let service = MoverService::new(source, config);

    let movers = service
        .get_top_movers(AssetType::Forex, 5, Timeframe::Hours1)
        .await
        .unwrap();

    // Ten candidates, three of which fail.
    assert_eq!(movers.len(), 5);
    for failed in ["EURUSD", "GBPUSD", "USDJPY"] {
        assert!(movers.iter().all(|m| m.symbol != failed));
    }
    assert_eq!(service.volatility().len(), 7);
}

#[tokio::test]
async fn volatility_history_steers_the_next_scan() {
    let source = Arc::new(MockCandleSource::new());
    for symbol in universe(AssetType::Forex) {
        source.set_series(symbol, flat_candles(dec!(1.2), 30)).await;
    }
    // A pair outside the common seed that moves a lot.
    source
        .set_series(
            "GBPNZD",
            candles_from_closes(&[dec!(2.0000), dec!(2.0000), dec!(2.0300)]),
        )
        .await;
    let service = MoverService::new(source.clone(), EngineConfig::default());

    // Cold start always samples the common pairs.
    service
        .get_top_movers(AssetType::Forex, 1, Timeframe::Hours1)
        .await
        .unwrap();
    for symbol in COMMON_FOREX_PAIRS {
        assert_eq!(source.calls_for(symbol).await, 1);
    }

    // Seen symbols are now remembered. Once GBPNZD has been observed it must
    // lead the rankings of a later scan on a fresh timeframe.
    service.volatility().record("GBPNZD", dec!(300));
    let movers = service
        .get_top_movers(AssetType::Forex, 1, Timeframe::Hours4)
        .await
        .unwrap();
    assert_eq!(movers[0].symbol, "GBPNZD");
    assert_eq!(movers[0].movement, dec!(300));
}

#[tokio::test]
async fn repeated_scans_are_served_from_cache() {
    let source = Arc::new(MockCandleSource::demo(9).await);
    let service = MoverService::new(source.clone(), EngineConfig::default());

    let first = service
        .get_movers_with_recommendations(
            AssetType::Crypto,
            3,
            Timeframe::Hours1,
            Timeframe::Hours1,
            Timeframe::Hours4,
        )
        .await
        .unwrap();
    let calls_after_first = source.total_calls().await;

    let again = service
        .apply_ema_filters(first.clone(), Timeframe::Hours1, Timeframe::Hours4)
        .await;
    let again = service.generate_recommendations(again);

    assert_eq!(source.total_calls().await, calls_after_first);
    for (a, b) in first.iter().zip(&again) {
        assert_eq!(a.ema_values, b.ema_values);
        let (ta, tb) = (
            a.recommended_trade.as_ref().unwrap(),
            b.recommended_trade.as_ref().unwrap(),
        );
        assert_eq!(ta.direction, tb.direction);
        assert_eq!(ta.stop_loss_price, tb.stop_loss_price);
        assert_eq!(ta.take_profit_price, tb.take_profit_price);
    }

    // A second ranking pass inside the TTL reads the same cached series.
    let reranked = service
        .get_top_movers(AssetType::Crypto, 3, Timeframe::Hours1)
        .await
        .unwrap();
    let mut shared = 0;
    for mover in &reranked {
        if let Some(earlier) = first.iter().find(|m| m.symbol == mover.symbol) {
            assert_eq!(earlier.movement, mover.movement);
            assert_eq!(earlier.direction, mover.direction);
            shared += 1;
        }
    }
    assert!(shared > 0);
}
