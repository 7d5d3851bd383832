//! Aggregate Quantity - total resting quantity per price on one side.
//!
//! Maintained incrementally by the matching loop so that volume queries are
//! a single hash lookup instead of a walk over the orders at a level.

use rustc_hash::FxHashMap;
use tracing::error;

use crate::error::{BookError, BookResult};
use crate::order::Side;

/// Price -> total resting quantity for one side of the book.
///
/// Entries that reach zero are removed, so a missing price and a zero
/// quantity are the same thing to callers.
#[derive(Clone, Debug)]
pub struct AggregateQuantity {
    side: Side,
    by_price: FxHashMap<u64, u64>,
}

impl AggregateQuantity {
    pub fn new(side: Side) -> Self {
        Self {
            side,
            by_price: FxHashMap::default(),
        }
    }

    pub fn with_capacity(side: Side, levels: usize) -> Self {
        Self {
            side,
            by_price: FxHashMap::with_capacity_and_hasher(levels, Default::default()),
        }
    }

    /// Total quantity resting at `price` (0 if none).
    ///
    /// # Complexity
    /// O(1)
    #[inline]
    pub fn get(&self, price: u64) -> u64 {
        self.by_price.get(&price).copied().unwrap_or(0)
    }

    /// Add resting quantity at `price`.
    ///
    /// # Returns
    /// The new total at `price`, or `BookError::QuantityOverflow` (with no
    /// change applied) if the counter would overflow.
    pub fn add(&mut self, price: u64, qty: u64) -> BookResult<u64> {
        let current = self.get(price);
        let Some(total) = current.checked_add(qty) else {
            error!(side = %self.side, price, current, qty, "aggregate quantity overflow");
            return Err(BookError::QuantityOverflow {
                side: self.side,
                price,
                resting: current,
                incoming: qty,
                executed: Vec::new(),
            });
        };
        if total > 0 {
            self.by_price.insert(price, total);
        }
        Ok(total)
    }

    /// Remove matched quantity at `price`.
    ///
    /// # Panics
    /// In debug builds, if more quantity is removed than is recorded. Release
    /// builds saturate to zero and log the inconsistency instead.
    pub fn remove(&mut self, price: u64, qty: u64) -> u64 {
        let current = self.get(price);
        let total = match current.checked_sub(qty) {
            Some(total) => total,
            None => {
                if cfg!(debug_assertions) {
                    panic!(
                        "aggregate quantity underflow on {} side at price {}: {} resting, {} removed",
                        self.side, price, current, qty
                    );
                }
                error!(side = %self.side, price, current, qty, "aggregate quantity underflow, saturating");
                0
            }
        };
        if total == 0 {
            self.by_price.remove(&price);
        } else {
            self.by_price.insert(price, total);
        }
        total
    }

    /// Number of prices with resting quantity
    #[inline]
    pub fn levels(&self) -> usize {
        self.by_price.len()
    }

    /// Sum over all prices, saturating at `u64::MAX`
    pub fn total(&self) -> u64 {
        self.by_price.values().fold(0, |acc, qty| acc.saturating_add(*qty))
    }

    /// Iterate `(price, quantity)` pairs in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (u64, u64)> + '_ {
        self.by_price.iter().map(|(&price, &qty)| (price, qty))
    }

    pub fn clear(&mut self) {
        self.by_price.clear();
    }
}
