//! Benchmark harness using Criterion for latency measurement.
//!
//! Every group runs once per book realization. Measures:
//! - Submit (no match)
//! - Submit (full match at one level)
//! - Multi-level sweep
//! - Queries against a deep book
//! - Random workload throughput

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use limit_book::{Engine, EngineKind, Order, OrderBook, Side, Submission};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// Generate a random submission around a 200 tick band
fn random_submission(rng: &mut ChaCha8Rng, timestamp: u64) -> Submission {
    Submission {
        side: if rng.gen_bool(0.5) { Side::Bid } else { Side::Ask },
        price: rng.gen_range(9_900..10_100),
        quantity: rng.gen_range(1..1_000),
        timestamp,
    }
}

/// Benchmark: Submit an order that rests (no matching)
fn bench_submit_no_match(c: &mut Criterion) {
    let mut group = c.benchmark_group("submit_no_match");

    for kind in EngineKind::ALL {
        group.bench_function(BenchmarkId::from_parameter(kind), |b| {
            let engine = Engine::with_capacity(kind, 100_000);
            let mut ts = 0u64;
            b.iter(|| {
                ts += 1;
                // Spread over 100 levels below any ask
                black_box(engine.submit_buy(Order::new(9_000 + ts % 100, 100, ts)))
            })
        });
    }

    group.finish();
}

/// Benchmark: Submit an order that fully matches the best resting order
fn bench_submit_full_match(c: &mut Criterion) {
    let mut group = c.benchmark_group("submit_full_match");

    for kind in EngineKind::ALL {
        for depth in [1u64, 10, 100] {
            group.bench_with_input(BenchmarkId::new(kind.to_string(), depth), &depth, |b, &depth| {
                let engine = Engine::with_capacity(kind, 100_000);
                for ts in 0..depth {
                    engine.submit_sell(Order::new(10_000, 100, ts)).unwrap();
                }

                let mut ts = depth;
                b.iter(|| {
                    ts += 2;
                    let result = engine.submit_buy(Order::new(10_000, 100, ts));
                    // Replenish the matched order
                    engine.submit_sell(Order::new(10_000, 100, ts + 1)).unwrap();
                    black_box(result)
                })
            });
        }
    }

    group.finish();
}

/// Benchmark: One order sweeping several price levels
fn bench_multi_level_sweep(c: &mut Criterion) {
    let mut group = c.benchmark_group("multi_level_sweep");

    for kind in EngineKind::ALL {
        for levels in [1u64, 5, 20] {
            group.bench_with_input(BenchmarkId::new(kind.to_string(), levels), &levels, |b, &levels| {
                let engine = Engine::with_capacity(kind, 1_000);
                let mut ts = 0u64;
                b.iter(|| {
                    for offset in 0..levels {
                        ts += 1;
                        engine.submit_sell(Order::new(10_000 + offset, 10, ts)).unwrap();
                    }
                    ts += 1;
                    black_box(engine.submit_buy(Order::new(10_000 + levels, 10 * levels, ts)))
                })
            });
        }
    }

    group.finish();
}

/// Benchmark: Read-only queries against a deep book
fn bench_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("queries");

    for kind in EngineKind::ALL {
        let engine = Engine::with_capacity(kind, 100_000);
        for ts in 0..50_000u64 {
            engine.submit_buy(Order::new(5_000 + ts % 1_000, 10, ts)).unwrap();
        }

        group.bench_function(BenchmarkId::new("best_bid", kind), |b| {
            b.iter(|| black_box(engine.best_bid()))
        });
        group.bench_function(BenchmarkId::new("quantity_at_bid", kind), |b| {
            let mut price = 5_000u64;
            b.iter(|| {
                price = 5_000 + (price + 1) % 1_000;
                black_box(engine.quantity_at_bid(price))
            })
        });
    }

    group.finish();
}

/// Benchmark: Throughput of a random crossing workload
fn bench_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("throughput");
    group.throughput(Throughput::Elements(1000));

    for kind in EngineKind::ALL {
        group.bench_function(BenchmarkId::from_parameter(kind), |b| {
            let engine = Engine::with_capacity(kind, 100_000);
            let mut rng = ChaCha8Rng::seed_from_u64(0xCAFEBABE);

            b.iter(|| {
                for ts in 0..1000 {
                    black_box(engine.process(random_submission(&mut rng, ts)).unwrap());
                }
                engine.clear();
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_submit_no_match,
    bench_submit_full_match,
    bench_multi_level_sweep,
    bench_queries,
    bench_throughput,
);

criterion_main!(benches);
