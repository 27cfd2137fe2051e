//! Unit tests for the mover service facade

use rust_decimal_macros::dec;
use std::sync::Arc;
use swingscan::cache::{CandleCache, VolatilityTracker};
use swingscan::config::EngineConfig;
use swingscan::core::{MoverService, MAX_MOVERS};
use swingscan::error::{EngineError, ProviderError};
use swingscan::models::indicators::Timeframe;
use swingscan::models::mover::AssetType;
use swingscan::movers::universe::universe;
use swingscan::services::MockCandleSource;

async fn demo_service() -> MoverService {
    let source = Arc::new(MockCandleSource::demo(11).await);
    MoverService::new(source, EngineConfig::default())
}

#[tokio::test]
async fn test_count_is_validated() {
    let service = demo_service().await;

    let zero = service
        .get_top_movers(AssetType::Forex, 0, Timeframe::Hours1)
        .await;
    assert_eq!(
        zero.unwrap_err(),
        EngineError::InvalidCount {
            count: 0,
            max: MAX_MOVERS
        }
    );

    let too_many = service
        .get_top_movers(AssetType::Forex, MAX_MOVERS + 1, Timeframe::Hours1)
        .await;
    tokio_test::assert_err!(too_many);
}

#[tokio::test]
async fn test_top_movers_sorted_by_absolute_movement() {
    let service = demo_service().await;

    let movers = tokio_test::assert_ok!(
        service
            .get_top_movers(AssetType::Forex, 5, Timeframe::Hours1)
            .await
    );

    assert_eq!(movers.len(), 5);
    for pair in movers.windows(2) {
        assert!(pair[0].movement.abs() >= pair[1].movement.abs());
    }
    for mover in &movers {
        assert_eq!(mover.asset_type, AssetType::Forex);
        assert!(universe(AssetType::Forex).contains(&mover.symbol.as_str()));
        assert!(mover.recommended_trade.is_none());
    }
}

#[tokio::test]
async fn test_ranking_feeds_volatility_history() {
    let service = demo_service().await;
    assert!(service.volatility().is_empty());

    service
        .get_top_movers(AssetType::Crypto, 2, Timeframe::Hours1)
        .await
        .unwrap();

    // Every fetched candidate is recorded, not just the two returned.
    assert_eq!(service.volatility().len(), 8);
}

#[tokio::test]
async fn test_provider_outage_yields_empty_result() {
    let source = Arc::new(MockCandleSource::new());
    for symbol in universe(AssetType::Crypto) {
        source.fail_symbol(symbol, ProviderError::RateLimited).await;
    }
    let service = MoverService::new(source, EngineConfig::default());

    let movers = service
        .get_top_movers(AssetType::Crypto, 5, Timeframe::Hours1)
        .await
        .unwrap();
    assert!(movers.is_empty());
}

#[tokio::test]
async fn test_ema_and_recommendation_stages_keep_identities() {
    let service = demo_service().await;
    let movers = service
        .get_top_movers(AssetType::Forex, 4, Timeframe::Hours1)
        .await
        .unwrap();
    let ranked: Vec<String> = movers.iter().map(|m| m.symbol.clone()).collect();

    let with_ema = service
        .apply_ema_filters(movers, Timeframe::Hours1, Timeframe::Hours4)
        .await;
    for mover in &with_ema {
        assert!(mover.ema(10).is_some());
        assert!(mover.ema(20).is_some());
        assert!(mover.ema(50).is_some());
    }

    let recommended = service.generate_recommendations(with_ema);
    let symbols: Vec<String> = recommended.iter().map(|m| m.symbol.clone()).collect();
    assert_eq!(symbols, ranked);
    assert!(recommended.iter().all(|m| m.recommended_trade.is_some()));
}

#[tokio::test]
async fn test_shared_components_are_reused() {
    let cache = Arc::new(CandleCache::new());
    let volatility = Arc::new(VolatilityTracker::new());
    volatility.record("SOLUSD", dec!(12));
    let source = Arc::new(MockCandleSource::demo(3).await);
    let service = MoverService::with_components(
        source.clone(),
        cache.clone(),
        volatility.clone(),
        EngineConfig::default(),
    );

    service
        .get_top_movers(AssetType::Crypto, 1, Timeframe::Hours4)
        .await
        .unwrap();

    assert!(Arc::ptr_eq(service.cache(), &cache));
    assert_eq!(cache.len(), 8);
    assert_eq!(source.calls_for("SOLUSD").await, 1);
}

#[tokio::test]
async fn test_combined_pipeline() {
    let service = demo_service().await;
    let movers = service
        .get_movers_with_recommendations(
            AssetType::Crypto,
            3,
            Timeframe::Hours1,
            Timeframe::Hours1,
            Timeframe::Hours4,
        )
        .await
        .unwrap();

    assert_eq!(movers.len(), 3);
    assert!(movers.iter().all(|m| m.recommended_trade.is_some()));
}
