//! Tradable symbol universes and per-pair pricing conventions.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::models::mover::AssetType;

pub const FOREX_PAIRS: [&str; 25] = [
    "EURUSD", "GBPUSD", "USDJPY", "AUDUSD", "USDCAD", "USDCHF", "NZDUSD", "EURGBP", "EURJPY",
    "GBPJPY", "AUDJPY", "EURAUD", "EURCHF", "GBPCHF", "CADJPY", "CHFJPY", "NZDJPY", "EURCAD",
    "GBPAUD", "AUDCAD", "AUDNZD", "GBPCAD", "EURNZD", "AUDCHF", "GBPNZD",
];

pub const CRYPTO_PAIRS: [&str; 15] = [
    "BTCUSD", "ETHUSD", "XRPUSD", "SOLUSD", "ADAUSD", "DOGEUSD", "DOTUSD", "LTCUSD", "LINKUSD",
    "BCHUSD", "AVAXUSD", "XLMUSD", "UNIUSD", "ATOMUSD", "MATICUSD",
];

/// Most liquid pairs, used to seed a cold start.
pub const COMMON_FOREX_PAIRS: [&str; 5] = ["EURUSD", "GBPUSD", "USDJPY", "AUDUSD", "USDCAD"];
pub const COMMON_CRYPTO_PAIRS: [&str; 4] = ["BTCUSD", "ETHUSD", "XRPUSD", "SOLUSD"];

pub fn universe(asset_type: AssetType) -> &'static [&'static str] {
    match asset_type {
        AssetType::Forex => &FOREX_PAIRS,
        AssetType::Crypto => &CRYPTO_PAIRS,
    }
}

pub fn common_pairs(asset_type: AssetType) -> &'static [&'static str] {
    match asset_type {
        AssetType::Forex => &COMMON_FOREX_PAIRS,
        AssetType::Crypto => &COMMON_CRYPTO_PAIRS,
    }
}

/// Minimum number of candidates scanned per request.
pub fn candidate_floor(asset_type: AssetType) -> usize {
    match asset_type {
        AssetType::Forex => 10,
        AssetType::Crypto => 8,
    }
}

pub fn is_jpy_pair(symbol: &str) -> bool {
    symbol.to_ascii_uppercase().contains("JPY")
}

/// Price units per pip.
pub fn pip_size(symbol: &str) -> Decimal {
    if is_jpy_pair(symbol) {
        dec!(0.01)
    } else {
        dec!(0.0001)
    }
}

/// Pips per price unit.
pub fn pip_multiplier(symbol: &str) -> Decimal {
    if is_jpy_pair(symbol) {
        dec!(100)
    } else {
        dec!(10000)
    }
}
