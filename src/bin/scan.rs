//! One-shot mover scan
//!
//! Usage:
//!   scan --asset-class forex --count 5
//!   scan --asset-class crypto --timeframe 4h --long-term 1d

use clap::Parser;
use dotenvy::dotenv;
use swingscan::config::EngineConfig;
use swingscan::core::MoverService;
use swingscan::logging;
use swingscan::models::indicators::Timeframe;
use swingscan::models::mover::{AssetType, MarketMover};
use swingscan::services::source_from_env;

#[derive(Parser, Debug)]
#[command(name = "scan")]
#[command(about = "Rank the top market movers and print trade recommendations")]
#[command(version)]
struct Args {
    /// Asset class to scan (forex, crypto)
    #[arg(short, long, default_value = "forex")]
    asset_class: AssetType,

    /// Number of movers to report (1-25)
    #[arg(short, long, default_value_t = 5)]
    count: usize,

    /// Timeframe used for ranking
    #[arg(short, long, default_value = "1h")]
    timeframe: String,

    /// Timeframe for EMA10/EMA20
    #[arg(long, default_value = "1h")]
    short_term: String,

    /// Timeframe for EMA50
    #[arg(long, default_value = "4h")]
    long_term: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    logging::init_logging();
    let args = Args::parse();

    let service = MoverService::new(source_from_env().await, EngineConfig::from_env());
    let movers = service
        .get_movers_with_recommendations(
            args.asset_class,
            args.count,
            Timeframe::parse_lenient(&args.timeframe),
            Timeframe::parse_lenient(&args.short_term),
            Timeframe::parse_lenient(&args.long_term),
        )
        .await?;

    if movers.is_empty() {
        println!("No movers found for {}", args.asset_class);
        return Ok(());
    }
    for (i, mover) in movers.iter().enumerate() {
        println!("Mover {}:", i + 1);
        print_mover(mover);
        println!();
    }

    Ok(())
}

fn print_mover(mover: &MarketMover) {
    let unit = match mover.asset_type {
        AssetType::Forex => " pips",
        AssetType::Crypto => "",
    };
    println!("  Symbol: {} ({})", mover.symbol, mover.timeframe);
    println!("  Price: {} (previous {})", mover.current_price, mover.previous_price);
    println!("  Movement: {}{} {:?}", mover.movement.round_dp(2), unit, mover.direction);
    for (period, value) in &mover.ema_values {
        println!("  EMA{}: {}", period, value.round_dp(5));
    }

    match mover.recommended_trade {
        Some(ref trade) => {
            println!("  Trade: {:?} {:?}", trade.direction, trade.order_type);
            println!(
                "  Entry {} / SL {} / TP {} (R:R {})",
                trade.entry_price,
                trade.stop_loss_price,
                trade.take_profit_price,
                trade.risk_reward_ratio
            );
            println!("  Signals:");
            for (i, signal) in trade.signals.iter().enumerate() {
                println!("    {}. {}", i + 1, signal);
            }
        }
        None => println!("  Trade: none (not enough EMA data)"),
    }
}
