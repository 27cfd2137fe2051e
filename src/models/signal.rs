use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeDirection {
    Buy,
    Sell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderType {
    MarketBuy,
    MarketSell,
    LimitBuy,
    LimitSell,
    StopBuy,
    StopSell,
}

impl OrderType {
    pub fn market(direction: TradeDirection) -> Self {
        match direction {
            TradeDirection::Buy => OrderType::MarketBuy,
            TradeDirection::Sell => OrderType::MarketSell,
        }
    }

    pub fn limit(direction: TradeDirection) -> Self {
        match direction {
            TradeDirection::Buy => OrderType::LimitBuy,
            TradeDirection::Sell => OrderType::LimitSell,
        }
    }

    pub fn stop(direction: TradeDirection) -> Self {
        match direction {
            TradeDirection::Buy => OrderType::StopBuy,
            TradeDirection::Sell => OrderType::StopSell,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecommendation {
    pub direction: TradeDirection,
    pub order_type: OrderType,
    pub entry_price: Decimal,
    pub stop_loss_price: Decimal,
    pub take_profit_price: Decimal,
    pub risk_reward_ratio: Decimal,
    pub rationale: String,
    pub signals: Vec<String>,
    pub timestamp: DateTime<Utc>,
}
