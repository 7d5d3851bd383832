//! Engine - selects one of the book realizations at runtime.
//!
//! Both realizations honor the same contract and produce identical fills
//! for identical input, so the choice is purely about performance profile.
//! With the `runtime` feature the engine can also be driven from an rtrb
//! ring buffer on a dedicated (optionally pinned) thread.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::book::OrderBook;
use crate::error::BookResult;
use crate::heap_book::HeapOrderBook;
use crate::level_book::LevelOrderBook;
use crate::order::{Order, Side, Submission, Trade};

/// Which backing store a book uses
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum EngineKind {
    /// Binary heap per side
    Heap,
    /// Ordered map of FIFO price levels per side
    PriceLevel,
}

impl EngineKind {
    /// Every realization, for tests and tools that exercise both
    pub const ALL: [EngineKind; 2] = [EngineKind::Heap, EngineKind::PriceLevel];
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineKind::Heap => f.write_str("heap"),
            EngineKind::PriceLevel => f.write_str("price-level"),
        }
    }
}

/// An order book of either realization.
pub enum Engine {
    Heap(HeapOrderBook),
    PriceLevel(LevelOrderBook),
}

macro_rules! dispatch {
    ($engine:expr, $book:ident => $body:expr) => {
        match $engine {
            Engine::Heap($book) => $body,
            Engine::PriceLevel($book) => $body,
        }
    };
}

impl Engine {
    /// Create an empty book of the given kind.
    pub fn new(kind: EngineKind) -> Self {
        Self::with_capacity(kind, 0)
    }

    /// Create an empty book with storage pre-allocated for `orders` per side.
    pub fn with_capacity(kind: EngineKind, orders: usize) -> Self {
        match kind {
            EngineKind::Heap => Engine::Heap(HeapOrderBook::with_capacity(orders)),
            EngineKind::PriceLevel => Engine::PriceLevel(LevelOrderBook::with_capacity(orders)),
        }
    }

    /// Which realization this is
    pub fn kind(&self) -> EngineKind {
        match self {
            Engine::Heap(_) => EngineKind::Heap,
            Engine::PriceLevel(_) => EngineKind::PriceLevel,
        }
    }

    /// Process a single submission and return its fills.
    ///
    /// This is the main entry point for synchronous usage (testing, benchmarks).
    #[inline]
    pub fn process(&self, submission: Submission) -> BookResult<Vec<Trade>> {
        self.submit(submission)
    }

    /// Clear all orders from the book
    pub fn clear(&self) {
        dispatch!(self, book => book.clear())
    }

    /// Pin the current thread to the last available CPU core.
    ///
    /// The last core is typically isolated from OS interrupts.
    pub fn pin_to_core() -> bool {
        core_affinity::get_core_ids()
            .and_then(|ids| ids.last().copied())
            .map(core_affinity::set_for_current)
            .unwrap_or(false)
    }

    /// Run the engine event loop.
    ///
    /// Drains submissions from `input` and pushes every fill to `output`,
    /// dropping fills when `output` is full. Returns once `input` is empty
    /// and its producer has been dropped.
    #[cfg(feature = "runtime")]
    pub fn run(
        &self,
        input: &mut rtrb::Consumer<Submission>,
        output: &mut rtrb::Producer<Trade>,
        pin_to_core: bool,
    ) {
        if pin_to_core && !Self::pin_to_core() {
            tracing::warn!("could not pin engine thread to a core");
        }
        tracing::info!(kind = %self.kind(), "engine loop started");

        loop {
            while let Ok(submission) = input.pop() {
                match self.process(submission) {
                    Ok(trades) => {
                        for trade in trades {
                            // Best effort - drop if full
                            let _ = output.push(trade);
                        }
                    }
                    Err(err) => tracing::error!(%err, "submission failed"),
                }
            }
            if input.is_abandoned() && input.is_empty() {
                break;
            }
            std::hint::spin_loop();
        }

        tracing::info!(kind = %self.kind(), "engine loop stopped");
    }
}

impl OrderBook for Engine {
    fn submit_buy(&self, order: Order) -> BookResult<Vec<Trade>> {
        dispatch!(self, book => book.submit_buy(order))
    }

    fn submit_sell(&self, order: Order) -> BookResult<Vec<Trade>> {
        dispatch!(self, book => book.submit_sell(order))
    }

    fn best_bid(&self) -> Option<Order> {
        dispatch!(self, book => book.best_bid())
    }

    fn best_ask(&self) -> Option<Order> {
        dispatch!(self, book => book.best_ask())
    }

    fn quantity_at_bid(&self, price: u64) -> u64 {
        dispatch!(self, book => book.quantity_at_bid(price))
    }

    fn quantity_at_ask(&self, price: u64) -> u64 {
        dispatch!(self, book => book.quantity_at_ask(price))
    }

    fn order_count(&self, side: Side) -> usize {
        dispatch!(self, book => book.order_count(side))
    }

    fn resting(&self, side: Side) -> Vec<Order> {
        dispatch!(self, book => book.resting(side))
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineKind::PriceLevel)
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        dispatch!(self, book => f.debug_tuple("Engine").field(&self.kind()).field(book).finish())
    }
}
