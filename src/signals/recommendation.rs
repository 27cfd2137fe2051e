//! Trade recommendations derived from a mover's EMA state.

use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::warn;

use crate::error::ComputationError;
use crate::models::mover::{AssetType, EmaStatus, MarketMover};
use crate::models::signal::{OrderType, TradeDirection, TradeRecommendation};
use crate::movers::universe::{is_jpy_pair, pip_size};

/// Reward is placed at twice the risk before clamping.
const REWARD_MULTIPLE: Decimal = dec!(2);
/// Target used when the clamped target lands on the losing side of entry.
const FLAT_TARGET_PCT: Decimal = dec!(0.01);

/// Asset-class and pair-aware distances, all in price units.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskProfile {
    /// Stop buffer beyond the EMA support/resistance.
    pub buffer: Decimal,
    pub max_stop_distance: Decimal,
    pub max_target_distance: Decimal,
    pub default_stop_distance: Decimal,
    pub default_target_distance: Decimal,
    pub decimals: u32,
}

impl RiskProfile {
    pub fn new(asset_type: AssetType, symbol: &str, entry: Decimal) -> Self {
        match asset_type {
            AssetType::Forex => {
                let pip = pip_size(symbol);
                Self {
                    buffer: entry * dec!(0.003),
                    max_stop_distance: pip * dec!(100),
                    max_target_distance: pip * dec!(300),
                    default_stop_distance: pip * dec!(30),
                    default_target_distance: pip * dec!(60),
                    decimals: if is_jpy_pair(symbol) { 3 } else { 5 },
                }
            }
            AssetType::Crypto => Self {
                buffer: entry * dec!(0.02),
                max_stop_distance: entry * dec!(0.05),
                max_target_distance: entry * dec!(0.15),
                default_stop_distance: entry * dec!(0.02),
                default_target_distance: entry * dec!(0.04),
                decimals: 2,
            },
        }
    }

    pub fn round(&self, price: Decimal) -> Decimal {
        price.round_dp(self.decimals)
    }

    /// Smallest price step at the rounding precision.
    pub fn tick(&self) -> Decimal {
        Decimal::new(1, self.decimals)
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Levels {
    stop_loss: Decimal,
    take_profit: Decimal,
    risk_reward: Decimal,
}

pub struct RecommendationGenerator;

impl RecommendationGenerator {
    /// `None` when neither EMA10 nor EMA20 has been computed.
    pub fn generate(mover: &MarketMover) -> Option<TradeRecommendation> {
        let ema10 = mover.ema(10);
        let ema20 = mover.ema(20);
        if ema10.is_none() && ema20.is_none() {
            return None;
        }

        let status = &mover.ema_status;
        let price = mover.current_price;
        let direction = infer_direction(price, ema10, ema20, mover.ema(50), status);
        let order_type = select_order_type(direction, status);

        let profile = RiskProfile::new(mover.asset_type, &mover.symbol, price);
        let entry = profile.round(price);

        let (levels, used_defaults) = match compute_levels(mover, direction, entry, &profile) {
            Ok(levels) => (levels, false),
            Err(e) => {
                warn!(
                    symbol = %mover.symbol,
                    timeframe = %mover.timeframe,
                    stage = "recommendation",
                    error = %e,
                    "RecommendationGenerator: falling back to default levels for {}",
                    mover.symbol
                );
                (default_levels(direction, entry, &profile), true)
            }
        };

        let rationale = build_rationale(
            mover,
            direction,
            order_type,
            entry,
            &levels,
            &profile,
            used_defaults,
        );

        Some(TradeRecommendation {
            direction,
            order_type,
            entry_price: entry,
            stop_loss_price: levels.stop_loss,
            take_profit_price: levels.take_profit,
            risk_reward_ratio: levels.risk_reward,
            rationale,
            signals: status.signals(),
            timestamp: Utc::now(),
        })
    }

    pub fn annotate(mover: MarketMover) -> MarketMover {
        match Self::generate(&mover) {
            Some(recommendation) => mover.with_recommendation(recommendation),
            None => mover,
        }
    }
}

/// Ordered fallback chain. The last step deliberately defaults to `Buy` when
/// nothing else decides.
pub fn infer_direction(
    price: Decimal,
    ema10: Option<Decimal>,
    ema20: Option<Decimal>,
    ema50: Option<Decimal>,
    status: &EmaStatus,
) -> TradeDirection {
    let (above_both, below_both) = match (ema10, ema20) {
        (Some(e10), Some(e20)) => (price > e10 && price > e20, price < e10 && price < e20),
        _ => (false, false),
    };
    let bouncing = status.is_bouncing_off_ema10 || status.is_bouncing_off_ema20;

    if above_both && (status.is_ema10_crossing_above_ema20 || bouncing) {
        return TradeDirection::Buy;
    }
    if below_both && (status.is_ema10_crossing_below_ema20 || bouncing) {
        return TradeDirection::Sell;
    }
    if above_both {
        return TradeDirection::Buy;
    }
    if below_both {
        return TradeDirection::Sell;
    }

    let breakouts = [
        (status.is_breaking_through_ema10, ema10),
        (status.is_breaking_through_ema20, ema20),
        (status.is_breaking_through_ema50, ema50),
    ];
    for (breaking, ema) in breakouts {
        if let (true, Some(ema)) = (breaking, ema) {
            return if price > ema {
                TradeDirection::Buy
            } else {
                TradeDirection::Sell
            };
        }
    }

    TradeDirection::Buy
}

/// Breakouts take stop orders, bounces limit orders, anything else goes to market.
pub fn select_order_type(direction: TradeDirection, status: &EmaStatus) -> OrderType {
    if status.any_breakout() {
        OrderType::stop(direction)
    } else if status.any_bounce() {
        OrderType::limit(direction)
    } else {
        OrderType::market(direction)
    }
}

fn compute_levels(
    mover: &MarketMover,
    direction: TradeDirection,
    entry: Decimal,
    profile: &RiskProfile,
) -> Result<Levels, ComputationError> {
    if entry <= Decimal::ZERO {
        return Err(ComputationError::NonPositivePrice {
            price: entry.to_string(),
        });
    }
    let ema10 = mover.ema(10).ok_or(ComputationError::MissingEma { period: 10 })?;
    let ema20 = mover.ema(20).ok_or(ComputationError::MissingEma { period: 20 })?;
    let emas = [Some(ema10), Some(ema20), mover.ema(50)];
    let emas = emas.iter().flatten().copied();

    let (stop_loss, take_profit) = match direction {
        TradeDirection::Buy => {
            let support = emas.min().unwrap_or(ema10);
            let raw_stop = support - profile.buffer;
            let raw_target = entry + REWARD_MULTIPLE * (entry - raw_stop);

            let stop = if raw_stop >= entry {
                entry - profile.default_stop_distance
            } else {
                raw_stop.max(entry - profile.max_stop_distance)
            };
            let mut target = raw_target.min(entry + profile.max_target_distance);
            if target <= entry {
                target = entry * (Decimal::ONE + FLAT_TARGET_PCT);
            }
            (stop, target)
        }
        TradeDirection::Sell => {
            let resistance = emas.max().unwrap_or(ema10);
            let raw_stop = resistance + profile.buffer;
            let raw_target = entry - REWARD_MULTIPLE * (raw_stop - entry);

            let stop = if raw_stop <= entry {
                entry + profile.default_stop_distance
            } else {
                raw_stop.min(entry + profile.max_stop_distance)
            };
            let mut target = raw_target.max(entry - profile.max_target_distance);
            if target >= entry {
                target = entry * (Decimal::ONE - FLAT_TARGET_PCT);
            }
            (stop, target)
        }
    };

    finalize_levels(direction, entry, stop_loss, take_profit, profile)
}

/// Round both levels and keep each at least one tick on its side of entry,
/// then derive risk/reward from the rounded prices.
fn finalize_levels(
    direction: TradeDirection,
    entry: Decimal,
    stop_loss: Decimal,
    take_profit: Decimal,
    profile: &RiskProfile,
) -> Result<Levels, ComputationError> {
    let tick = profile.tick();
    let stop_loss = profile.round(stop_loss);
    let take_profit = profile.round(take_profit);
    let (stop_loss, take_profit) = match direction {
        TradeDirection::Buy => (stop_loss.min(entry - tick), take_profit.max(entry + tick)),
        TradeDirection::Sell => (stop_loss.max(entry + tick), take_profit.min(entry - tick)),
    };

    let risk = (entry - stop_loss).abs();
    let reward = (take_profit - entry).abs();
    let risk_reward = reward
        .checked_div(risk)
        .ok_or(ComputationError::DivisionByZero {
            context: "risk/reward",
        })?
        .round_dp(2);

    Ok(Levels {
        stop_loss,
        take_profit,
        risk_reward,
    })
}

fn default_levels(direction: TradeDirection, entry: Decimal, profile: &RiskProfile) -> Levels {
    let (stop_loss, take_profit) = match direction {
        TradeDirection::Buy => (
            entry - profile.default_stop_distance,
            entry + profile.default_target_distance,
        ),
        TradeDirection::Sell => (
            entry + profile.default_stop_distance,
            entry - profile.default_target_distance,
        ),
    };
    finalize_levels(direction, entry, stop_loss, take_profit, profile).unwrap_or(Levels {
        stop_loss: profile.round(stop_loss),
        take_profit: profile.round(take_profit),
        risk_reward: REWARD_MULTIPLE,
    })
}

fn build_rationale(
    mover: &MarketMover,
    direction: TradeDirection,
    order_type: OrderType,
    entry: Decimal,
    levels: &Levels,
    profile: &RiskProfile,
    used_defaults: bool,
) -> String {
    let price = mover.current_price;
    let emas: Vec<String> = [10, 20, 50]
        .iter()
        .filter_map(|&period| {
            mover.ema(period).map(|value| {
                let side = if price > value { "above" } else { "below" };
                format!("EMA{} {} (price {})", period, profile.round(value), side)
            })
        })
        .collect();

    let signals = mover.ema_status.signals();
    let signals = if signals.is_empty() {
        "none".to_string()
    } else {
        signals.join(", ")
    };

    let mut rationale = format!(
        "{} {:?} ({:?}) on {}. {}. Signals: {}.",
        mover.symbol,
        direction,
        order_type,
        mover.timeframe,
        emas.join("; "),
        signals
    );
    if used_defaults {
        rationale.push_str(" Levels use default distances.");
    }
    rationale.push_str(&format!(
        " Entry {}, stop {}, target {}, risk/reward {}.",
        entry, levels.stop_loss, levels.take_profit, levels.risk_reward
    ));
    rationale
}
