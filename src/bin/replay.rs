//! Replay a CSV file of submissions through the order book.
//!
//! Input columns: `side,price,quantity,timestamp` where `side` is one of
//! `bid`, `ask`, `buy` or `sell`. Every submission is run through both
//! realizations and their fills are compared step by step; the fills are
//! written to stdout as CSV.

use clap::Parser;
use limit_book::{Engine, EngineKind, OrderBook, Side, Submission, Trade};
use serde::Serialize;
use std::error::Error;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "replay")]
#[command(about = "Replay CSV submissions and cross-check both book realizations", long_about = None)]
struct Args {
    /// CSV file of submissions
    input: PathBuf,

    /// Realization whose fills are printed
    #[arg(short, long, value_enum, default_value_t = EngineKind::PriceLevel)]
    engine: EngineKind,

    /// Skip the cross-check and run only the selected realization
    #[arg(long, default_value_t = false)]
    no_verify: bool,

    /// Log filter used when RUST_LOG is unset
    #[arg(short = 'l', long, default_value = "info")]
    log_level: String,
}

/// One output row: the fill plus the submission that caused it.
#[derive(Serialize)]
struct FillRow {
    taker_timestamp: u64,
    taker_side: Side,
    price: u64,
    quantity: u64,
    maker_timestamp: u64,
}

impl FillRow {
    fn new(taker: &Submission, trade: &Trade) -> Self {
        Self {
            taker_timestamp: taker.timestamp,
            taker_side: taker.side,
            price: trade.price,
            quantity: trade.quantity,
            maker_timestamp: trade.timestamp,
        }
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_logging(&args.log_level);

    let primary = Engine::new(args.engine);
    let shadow = (!args.no_verify).then(|| {
        let other = EngineKind::ALL
            .into_iter()
            .find(|kind| *kind != args.engine)
            .unwrap_or(args.engine);
        Engine::new(other)
    });

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(&args.input)?;
    let mut writer = csv::Writer::from_writer(io::stdout().lock());

    let mut submissions = 0u64;
    let mut fills = 0u64;
    for row in reader.deserialize() {
        let sub: Submission = row?;
        submissions += 1;

        let trades = primary.process(sub)?;

        if let Some(shadow) = &shadow {
            let expected = shadow.process(sub)?;
            if trades != expected {
                tracing::error!(timestamp = sub.timestamp, "realizations diverged");
                return Err(format!(
                    "fills diverged at timestamp {}: {} produced {:?}, {} produced {:?}",
                    sub.timestamp,
                    primary.kind(),
                    trades,
                    shadow.kind(),
                    expected
                )
                .into());
            }
            if (primary.best_bid(), primary.best_ask()) != (shadow.best_bid(), shadow.best_ask()) {
                return Err(format!("top of book diverged at timestamp {}", sub.timestamp).into());
            }
        }

        for trade in &trades {
            writer.serialize(FillRow::new(&sub, trade))?;
        }
        fills += trades.len() as u64;
    }
    writer.flush()?;

    tracing::info!(
        engine = %args.engine,
        submissions,
        fills,
        resting_bids = primary.order_count(Side::Bid),
        resting_asks = primary.order_count(Side::Ask),
        verified = shadow.is_some(),
        "replay complete"
    );
    Ok(())
}
