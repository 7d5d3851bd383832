//! Price-level storage - an ordered map of FIFO queues.
//!
//! Each side maps price -> queue of orders at that price, oldest first.
//! The best order is the head of the queue at the best price key.
//!
//! | Operation   | Cost                       |
//! |-------------|----------------------------|
//! | peek        | O(log P)                   |
//! | pop         | O(log P) + O(1) queue pop  |
//! | reduce_top  | O(log P), in place         |
//! | insert      | O(log P) + O(1) queue push |
//!
//! P = number of distinct price levels on the side.

use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::marker::PhantomData;

use crate::book::{LimitOrderBook, RestingOrders};
use crate::order::Order;
use crate::priority::{Asks, Bids, Priority};

/// Orders at a single price, oldest first.
pub type PriceLevel = VecDeque<Order>;

/// Resting orders of one side, grouped by price level.
///
/// Empty levels are removed as soon as their last order leaves, so every
/// key in `levels` has at least one order.
pub struct LevelSide<P> {
    levels: BTreeMap<u64, PriceLevel>,
    count: usize,
    _policy: PhantomData<P>,
}

impl<P: Priority> LevelSide<P> {
    pub fn new() -> Self {
        Self {
            levels: BTreeMap::new(),
            count: 0,
            _policy: PhantomData,
        }
    }

    /// Get the number of price levels
    #[inline]
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// Best price, if any
    #[inline]
    pub fn best_price(&self) -> Option<u64> {
        P::best_level(&self.levels).map(|(price, _)| *price)
    }

    /// Orders resting at `price`, oldest first.
    pub fn level(&self, price: u64) -> Option<&PriceLevel> {
        self.levels.get(&price)
    }

    /// Top `n` levels as `(price, total quantity, order count)`, best first.
    ///
    /// Walks each returned level; use the side's aggregate map for single
    /// price lookups.
    pub fn depth(&self, n: usize) -> Vec<(u64, u64, usize)> {
        P::levels_best_first(&self.levels)
            .take(n)
            .map(|(&price, level)| (price, level.iter().map(|o| o.quantity).sum(), level.len()))
            .collect()
    }
}

impl<P: Priority> Default for LevelSide<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Priority> fmt::Debug for LevelSide<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LevelSide")
            .field("side", &P::SIDE)
            .field("best_price", &self.best_price())
            .field("levels", &self.levels.len())
            .field("orders", &self.count)
            .finish()
    }
}

impl<P: Priority> RestingOrders for LevelSide<P> {
    type Policy = P;

    fn with_capacity(_orders: usize) -> Self {
        Self::new()
    }

    #[inline]
    fn peek(&self) -> Option<&Order> {
        P::best_level(&self.levels).and_then(|(_, level)| level.front())
    }

    fn pop(&mut self) -> Option<Order> {
        let mut entry = P::best_level_mut(&mut self.levels)?;
        let order = entry.get_mut().pop_front();
        if entry.get().is_empty() {
            entry.remove();
        }
        if order.is_some() {
            self.count -= 1;
        }
        order
    }

    fn reduce_top(&mut self, qty: u64) {
        if let Some(head) = P::best_level_mut(&mut self.levels)
            .and_then(|entry| entry.into_mut().front_mut())
        {
            debug_assert!(head.quantity > qty, "reduce_top must leave quantity resting");
            head.quantity -= qty;
        }
    }

    fn insert(&mut self, order: Order) {
        self.levels.entry(order.price).or_default().push_back(order);
        self.count += 1;
    }

    #[inline]
    fn len(&self) -> usize {
        self.count
    }

    fn orders(&self) -> Vec<Order> {
        P::levels_best_first(&self.levels)
            .flat_map(|(_, level)| level.iter().copied())
            .collect()
    }

    fn clear(&mut self) {
        self.levels.clear();
        self.count = 0;
    }
}

/// Order book with price-level FIFO queues on both sides.
pub type LevelOrderBook = LimitOrderBook<LevelSide<Bids>, LevelSide<Asks>>;

impl LevelOrderBook {
    /// Top `n` bid levels as `(price, quantity, orders)`, highest first.
    pub fn bid_depth(&self, n: usize) -> Vec<(u64, u64, usize)> {
        self.with_bids(|bids| bids.store().depth(n))
    }

    /// Top `n` ask levels as `(price, quantity, orders)`, lowest first.
    pub fn ask_depth(&self, n: usize) -> Vec<(u64, u64, usize)> {
        self.with_asks(|asks| asks.store().depth(n))
    }
}
