//! Market mover records accumulated across the scan pipeline.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::indicators::Timeframe;
use super::signal::TradeRecommendation;
use crate::error::EngineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetType {
    Forex,
    Crypto,
}

impl AssetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetType::Forex => "Forex",
            AssetType::Crypto => "Crypto",
        }
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetType {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "forex" | "fx" => Ok(AssetType::Forex),
            "crypto" | "cryptocurrency" => Ok(AssetType::Crypto),
            _ => Err(EngineError::InvalidAssetClass(s.to_string())),
        }
    }
}

/// Two-valued on purpose: a zero movement is reported as `Down`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveDirection {
    Up,
    Down,
}

/// EMA-derived boolean state for one symbol. Every flag defaults to false.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmaStatus {
    pub is_above_ema10: bool,
    pub is_above_ema20: bool,
    pub is_above_ema50: bool,
    pub is_ema10_crossing_above_ema20: bool,
    pub is_ema10_crossing_below_ema20: bool,
    pub is_bouncing_off_ema10: bool,
    pub is_bouncing_off_ema20: bool,
    pub is_bouncing_off_ema50: bool,
    pub is_breaking_through_ema10: bool,
    pub is_breaking_through_ema20: bool,
    pub is_breaking_through_ema50: bool,
}

impl EmaStatus {
    /// Human-readable description of every flag that is currently set.
    pub fn signals(&self) -> Vec<String> {
        let flags = [
            (self.is_above_ema10, "Price above EMA10"),
            (self.is_above_ema20, "Price above EMA20"),
            (self.is_above_ema50, "Price above EMA50"),
            (self.is_ema10_crossing_above_ema20, "EMA10 crossing above EMA20"),
            (self.is_ema10_crossing_below_ema20, "EMA10 crossing below EMA20"),
            (self.is_bouncing_off_ema10, "Bouncing off EMA10"),
            (self.is_bouncing_off_ema20, "Bouncing off EMA20"),
            (self.is_bouncing_off_ema50, "Bouncing off EMA50"),
            (self.is_breaking_through_ema10, "Breaking through EMA10"),
            (self.is_breaking_through_ema20, "Breaking through EMA20"),
            (self.is_breaking_through_ema50, "Breaking through EMA50"),
        ];
        flags
            .iter()
            .filter(|(set, _)| *set)
            .map(|(_, text)| text.to_string())
            .collect()
    }

    pub fn any_breakout(&self) -> bool {
        self.is_breaking_through_ema10
            || self.is_breaking_through_ema20
            || self.is_breaking_through_ema50
    }

    pub fn any_bounce(&self) -> bool {
        self.is_bouncing_off_ema10 || self.is_bouncing_off_ema20 || self.is_bouncing_off_ema50
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketMover {
    pub symbol: String,
    pub asset_type: AssetType,
    pub timeframe: Timeframe,
    pub current_price: Decimal,
    pub previous_price: Decimal,
    pub movement: Decimal,
    pub direction: MoveDirection,
    /// EMA period -> value; a period is present only if it was computed.
    #[serde(default)]
    pub ema_values: BTreeMap<u32, Decimal>,
    #[serde(default)]
    pub ema_status: EmaStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommended_trade: Option<TradeRecommendation>,
    pub timestamp: DateTime<Utc>,
}

impl MarketMover {
    pub fn new(
        symbol: String,
        asset_type: AssetType,
        timeframe: Timeframe,
        current_price: Decimal,
        previous_price: Decimal,
        movement: Decimal,
    ) -> Self {
        let direction = if movement > Decimal::ZERO {
            MoveDirection::Up
        } else {
            MoveDirection::Down
        };
        Self {
            symbol,
            asset_type,
            timeframe,
            current_price,
            previous_price,
            movement,
            direction,
            ema_values: BTreeMap::new(),
            ema_status: EmaStatus::default(),
            recommended_trade: None,
            timestamp: Utc::now(),
        }
    }

    /// Returns a copy carrying EMA annotations. Previously computed EMA values
    /// are kept unless recomputed.
    pub fn with_ema(mut self, values: BTreeMap<u32, Decimal>, status: EmaStatus) -> Self {
        self.ema_values.extend(values);
        self.ema_status = status;
        self
    }

    pub fn with_recommendation(mut self, recommendation: TradeRecommendation) -> Self {
        self.recommended_trade = Some(recommendation);
        self
    }

    pub fn ema(&self, period: u32) -> Option<Decimal> {
        self.ema_values.get(&period).copied()
    }
}
