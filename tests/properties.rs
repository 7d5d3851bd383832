//! Property-based tests over arbitrary submission sequences.

use limit_book::{Engine, EngineKind, OrderBook, Side, Submission};
use proptest::prelude::*;

/// Submissions with a narrow price band so that crossing is frequent.
fn submissions(max_len: usize) -> impl Strategy<Value = Vec<Submission>> {
    prop::collection::vec((any::<bool>(), 95u64..105, 0u64..50), 1..max_len).prop_map(|raw| {
        raw.into_iter()
            .enumerate()
            .map(|(i, (is_buy, price, quantity))| Submission {
                side: if is_buy { Side::Bid } else { Side::Ask },
                price,
                quantity,
                timestamp: i as u64 + 1,
            })
            .collect()
    })
}

fn resting_at(engine: &Engine, side: Side, price: u64) -> u64 {
    engine
        .resting(side)
        .iter()
        .filter(|o| o.price == price)
        .map(|o| o.quantity)
        .sum()
}

proptest! {
    #[test]
    fn prop_quantity_is_conserved(subs in submissions(200)) {
        for kind in EngineKind::ALL {
            let engine = Engine::new(kind);
            let mut traded = 0u64;
            for sub in &subs {
                let trades = engine.process(*sub).unwrap();
                let filled: u64 = trades.iter().map(|t| t.quantity).sum();
                prop_assert!(filled <= sub.quantity);
                traded += filled;
            }
            let submitted: u64 = subs.iter().map(|s| s.quantity).sum();
            let resting: u64 = [Side::Bid, Side::Ask]
                .into_iter()
                .flat_map(|side| engine.resting(side))
                .map(|o| o.quantity)
                .sum();
            prop_assert_eq!(submitted, resting + 2 * traded);
        }
    }

    #[test]
    fn prop_aggregates_match_resting_orders(subs in submissions(200)) {
        for kind in EngineKind::ALL {
            let engine = Engine::new(kind);
            for sub in &subs {
                engine.process(*sub).unwrap();
            }
            for side in [Side::Bid, Side::Ask] {
                for price in 95..105 {
                    prop_assert_eq!(engine.quantity_at(side, price), resting_at(&engine, side, price));
                }
            }
        }
    }

    #[test]
    fn prop_book_never_left_crossed(subs in submissions(200)) {
        let engine = Engine::default();
        for sub in &subs {
            engine.process(*sub).unwrap();
            if let (Some(bid), Some(ask)) = (engine.best_bid(), engine.best_ask()) {
                prop_assert!(bid.price < ask.price);
            }
        }
    }

    #[test]
    fn prop_resting_orders_are_positive(subs in submissions(200)) {
        let engine = Engine::new(EngineKind::Heap);
        for sub in &subs {
            engine.process(*sub).unwrap();
        }
        for side in [Side::Bid, Side::Ask] {
            prop_assert!(engine.resting(side).iter().all(|o| o.quantity > 0));
        }
    }

    #[test]
    fn prop_fills_respect_limit_and_priority(subs in submissions(200)) {
        let engine = Engine::default();
        for sub in &subs {
            let trades = engine.process(*sub).unwrap();
            for trade in &trades {
                match sub.side {
                    Side::Bid => prop_assert!(trade.price <= sub.price),
                    Side::Ask => prop_assert!(trade.price >= sub.price),
                }
                prop_assert!(trade.timestamp < sub.timestamp);
            }
            for pair in trades.windows(2) {
                let (a, b) = (pair[0], pair[1]);
                let better_or_same = match sub.side {
                    Side::Bid => a.price <= b.price,
                    Side::Ask => a.price >= b.price,
                };
                prop_assert!(better_or_same);
                if a.price == b.price {
                    prop_assert!(a.timestamp < b.timestamp);
                }
            }
        }
    }

    #[test]
    fn prop_queries_are_pure(subs in submissions(100)) {
        let engine = Engine::default();
        for sub in &subs {
            engine.process(*sub).unwrap();
        }
        let before = (engine.best_bid(), engine.best_ask(), engine.resting(Side::Bid), engine.resting(Side::Ask));
        for price in 95..105 {
            engine.quantity_at_bid(price);
            engine.quantity_at_ask(price);
        }
        let after = (engine.best_bid(), engine.best_ask(), engine.resting(Side::Bid), engine.resting(Side::Ask));
        prop_assert_eq!(before, after);
    }

    #[test]
    fn prop_realizations_agree(subs in submissions(300)) {
        let heap = Engine::new(EngineKind::Heap);
        let levels = Engine::new(EngineKind::PriceLevel);
        for sub in &subs {
            prop_assert_eq!(heap.process(*sub).unwrap(), levels.process(*sub).unwrap());
            prop_assert_eq!(heap.best_bid(), levels.best_bid());
            prop_assert_eq!(heap.best_ask(), levels.best_ask());
        }
        for side in [Side::Bid, Side::Ask] {
            prop_assert_eq!(heap.resting(side), levels.resting(side));
        }
    }
}
