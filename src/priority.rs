//! Priority policy - which resting order matches first on each side.
//!
//! Bids: higher price first, then earlier timestamp.
//! Asks: lower price first, then earlier timestamp.
//!
//! Quantity never takes part in priority.

use std::cmp::Ordering;
use std::collections::btree_map::{BTreeMap, OccupiedEntry};

use crate::order::{Order, Side};

/// Ordering rules for one side of the book.
///
/// Implemented by the zero-sized markers [`Bids`] and [`Asks`] so that each
/// storage strategy can be specialized per side at compile time.
pub trait Priority: Send + Sync + 'static {
    /// The side this policy orders
    const SIDE: Side;

    /// Compare two resting orders.
    ///
    /// `Ordering::Greater` means `a` is matched before `b`.
    fn compare(a: &Order, b: &Order) -> Ordering;

    /// Whether an incoming order at `incoming_price` crosses a resting
    /// order on this side at `resting_price`.
    fn is_marketable(incoming_price: u64, resting_price: u64) -> bool;

    /// The best price level of a price-keyed map.
    fn best_level<V>(levels: &BTreeMap<u64, V>) -> Option<(&u64, &V)>;

    /// Mutable entry for the best price level of a price-keyed map.
    fn best_level_mut<V>(levels: &mut BTreeMap<u64, V>) -> Option<OccupiedEntry<'_, u64, V>>;

    /// Price levels from best to worst.
    fn levels_best_first<V>(levels: &BTreeMap<u64, V>) -> Box<dyn Iterator<Item = (&u64, &V)> + '_>;
}

/// Earlier timestamp wins.
#[inline]
fn by_arrival(a: &Order, b: &Order) -> Ordering {
    b.timestamp.cmp(&a.timestamp)
}

/// Buy side policy
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Bids;

/// Sell side policy
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Asks;

impl Priority for Bids {
    const SIDE: Side = Side::Bid;

    #[inline]
    fn compare(a: &Order, b: &Order) -> Ordering {
        a.price.cmp(&b.price).then_with(|| by_arrival(a, b))
    }

    /// Seller willing to accept <= highest bid
    #[inline]
    fn is_marketable(incoming_price: u64, resting_price: u64) -> bool {
        incoming_price <= resting_price
    }

    #[inline]
    fn best_level<V>(levels: &BTreeMap<u64, V>) -> Option<(&u64, &V)> {
        levels.iter().next_back()
    }

    #[inline]
    fn best_level_mut<V>(levels: &mut BTreeMap<u64, V>) -> Option<OccupiedEntry<'_, u64, V>> {
        levels.last_entry()
    }

    fn levels_best_first<V>(levels: &BTreeMap<u64, V>) -> Box<dyn Iterator<Item = (&u64, &V)> + '_> {
        Box::new(levels.iter().rev())
    }
}

impl Priority for Asks {
    const SIDE: Side = Side::Ask;

    #[inline]
    fn compare(a: &Order, b: &Order) -> Ordering {
        b.price.cmp(&a.price).then_with(|| by_arrival(a, b))
    }

    /// Buyer willing to pay >= lowest ask
    #[inline]
    fn is_marketable(incoming_price: u64, resting_price: u64) -> bool {
        incoming_price >= resting_price
    }

    #[inline]
    fn best_level<V>(levels: &BTreeMap<u64, V>) -> Option<(&u64, &V)> {
        levels.iter().next()
    }

    #[inline]
    fn best_level_mut<V>(levels: &mut BTreeMap<u64, V>) -> Option<OccupiedEntry<'_, u64, V>> {
        levels.first_entry()
    }

    fn levels_best_first<V>(levels: &BTreeMap<u64, V>) -> Box<dyn Iterator<Item = (&u64, &V)> + '_> {
        Box::new(levels.iter())
    }
}
