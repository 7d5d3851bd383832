//! Per-submission latency report backed by an HDR histogram.
//!
//! Runs a fixed crossing workload against one or both book realizations
//! and prints percentiles in nanoseconds.

use clap::Parser;
use hdrhistogram::Histogram;
use limit_book::{Engine, EngineKind, Submission};
use std::error::Error;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "latency-report")]
#[command(about = "Measure submission latency of the order book realizations", long_about = None)]
struct Args {
    /// Book realization to measure (both when omitted)
    #[arg(short, long, value_enum)]
    engine: Option<EngineKind>,

    /// Number of submissions to time
    #[arg(short = 'n', long, default_value_t = 1_000_000)]
    iterations: u64,

    /// Orders pre-allocated per side
    #[arg(long, default_value_t = 100_000)]
    capacity: usize,

    /// Pin the measuring thread to a core
    #[arg(long, default_value_t = false)]
    pin: bool,

    /// Log filter used when RUST_LOG is unset
    #[arg(short = 'l', long, default_value = "warn")]
    log_level: String,
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Alternating buys and sells over a 100 tick band so that roughly half of
/// the submissions cross.
fn submission(i: u64) -> Submission {
    let price = 10_000 + (i.wrapping_mul(7919) % 100);
    let quantity = 1 + i % 20;
    if i % 2 == 0 {
        Submission::buy(price, quantity, i)
    } else {
        Submission::sell(price, quantity, i)
    }
}

fn measure(kind: EngineKind, args: &Args) -> Result<(), Box<dyn Error>> {
    let engine = Engine::with_capacity(kind, args.capacity);
    let mut histogram = Histogram::<u64>::new_with_bounds(1, 1_000_000, 3)?;

    // Warm up caches and allocations before timing
    for i in 0..args.iterations.min(10_000) {
        engine.process(submission(i))?;
    }
    engine.clear();

    tracing::info!(%kind, iterations = args.iterations, "running");

    let mut total = Duration::ZERO;
    let mut fills = 0usize;
    for i in 0..args.iterations {
        let sub = submission(i);

        let start = Instant::now();
        let trades = std::hint::black_box(engine.process(sub))?;
        let elapsed = start.elapsed();

        fills += trades.len();
        // Outliers beyond the histogram bound are clamped
        histogram.saturating_record(elapsed.as_nanos() as u64);
        total += elapsed;
    }

    println!("\n=== Latency Report: {kind} (ns) ===");
    println!("Total Ops:  {}", args.iterations);
    println!("Fills:      {fills}");
    println!("Throughput: {:.2} ops/sec", args.iterations as f64 / total.as_secs_f64());
    println!("---------------------------");
    println!("Min:    {:6} ns", histogram.min());
    println!("P50:    {:6} ns", histogram.value_at_quantile(0.50));
    println!("P90:    {:6} ns", histogram.value_at_quantile(0.90));
    println!("P99:    {:6} ns", histogram.value_at_quantile(0.99));
    println!("P99.9:  {:6} ns", histogram.value_at_quantile(0.999));
    println!("P99.99: {:6} ns", histogram.value_at_quantile(0.9999));
    println!("Max:    {:6} ns", histogram.max());
    println!("---------------------------");

    println!("\nDistribution:");
    for v in histogram.iter_log(100, 2.0) {
        let count = v.count_since_last_iteration();
        if count > 0 {
            println!("<= {:8} ns: {:10}", v.value_iterated_to(), count);
        }
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_logging(&args.log_level);

    if args.pin && !Engine::pin_to_core() {
        tracing::warn!("could not pin to a core; measuring unpinned");
    }

    let kinds = match args.engine {
        Some(kind) => vec![kind],
        None => EngineKind::ALL.to_vec(),
    };
    for kind in kinds {
        measure(kind, &args)?;
    }
    Ok(())
}
