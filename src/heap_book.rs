//! Heap-backed storage - one binary heap per side.
//!
//! `std::collections::BinaryHeap` has no decrease-key, so a partial fill is
//! done as pop, mutate, re-push. The reduced order keeps its price and
//! timestamp, and quantity takes no part in priority, so it lands back at
//! the top ahead of every later order at the same price.
//!
//! | Operation   | Cost       |
//! |-------------|------------|
//! | peek        | O(1)       |
//! | pop         | O(log n)   |
//! | reduce_top  | O(log n)   |
//! | insert      | O(log n)   |

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt;
use std::marker::PhantomData;

use crate::book::{LimitOrderBook, RestingOrders};
use crate::order::Order;
use crate::priority::{Asks, Bids, Priority};

/// An order ordered by the policy `P` (greatest = matched first).
struct Ranked<P> {
    order: Order,
    _policy: PhantomData<P>,
}

impl<P> Ranked<P> {
    #[inline]
    fn new(order: Order) -> Self {
        Self {
            order,
            _policy: PhantomData,
        }
    }
}

impl<P: Priority> PartialEq for Ranked<P> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<P: Priority> Eq for Ranked<P> {}

impl<P: Priority> PartialOrd for Ranked<P> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<P: Priority> Ord for Ranked<P> {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        P::compare(&self.order, &other.order)
    }
}

/// Resting orders of one side in a max-heap keyed by `P`.
pub struct HeapSide<P> {
    heap: BinaryHeap<Ranked<P>>,
}

impl<P: Priority> HeapSide<P> {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
        }
    }
}

impl<P: Priority> Default for HeapSide<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Priority> fmt::Debug for HeapSide<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeapSide")
            .field("side", &P::SIDE)
            .field("orders", &self.heap.len())
            .field("top", &self.peek())
            .finish()
    }
}

impl<P: Priority> RestingOrders for HeapSide<P> {
    type Policy = P;

    fn with_capacity(orders: usize) -> Self {
        Self {
            heap: BinaryHeap::with_capacity(orders),
        }
    }

    #[inline]
    fn peek(&self) -> Option<&Order> {
        self.heap.peek().map(|ranked| &ranked.order)
    }

    #[inline]
    fn pop(&mut self) -> Option<Order> {
        self.heap.pop().map(|ranked| ranked.order)
    }

    fn reduce_top(&mut self, qty: u64) {
        if let Some(mut top) = self.heap.pop() {
            debug_assert!(top.order.quantity > qty, "reduce_top must leave quantity resting");
            top.order.quantity -= qty;
            self.heap.push(top);
        }
    }

    #[inline]
    fn insert(&mut self, order: Order) {
        self.heap.push(Ranked::new(order));
    }

    #[inline]
    fn len(&self) -> usize {
        self.heap.len()
    }

    fn orders(&self) -> Vec<Order> {
        let mut orders: Vec<Order> = self.heap.iter().map(|ranked| ranked.order).collect();
        orders.sort_unstable_by(|a, b| P::compare(b, a));
        orders
    }

    fn clear(&mut self) {
        self.heap.clear();
    }
}

/// Order book with a max-heap of bids and a min-heap of asks.
pub type HeapOrderBook = LimitOrderBook<HeapSide<Bids>, HeapSide<Asks>>;
