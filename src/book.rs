//! Order Book - the contract every backing strategy implements, and the
//! per-side locked book that realizes it.
//!
//! A book has two independent sides. Each side is a [`SideBook`]: a
//! priority-ordered store of resting orders plus its aggregate quantity map.
//! The store is pluggable through [`RestingOrders`]; the matching loop in
//! [`crate::matching`] is written once against that trait.
//!
//! ## Locking
//!
//! ```text
//!   submit_buy:   [asks: write] cross ---- release ---- [bids: write] rest
//!   submit_sell:  [bids: write] cross ---- release ---- [asks: write] rest
//!   best_bid / quantity_at_bid:  [bids: read]
//!   best_ask / quantity_at_ask:  [asks: read]
//! ```
//!
//! The two critical sections of a submission never nest, so no lock ordering
//! is needed and a lock is never held while waiting for the other side.

use parking_lot::RwLock;
use tracing::debug;

use crate::aggregate::AggregateQuantity;
use crate::error::{BookError, BookResult};
use crate::matching::{cross_order, rest_order};
use crate::order::{Order, Side, Submission, Trade};
use crate::priority::{Asks, Bids, Priority};

// ============================================================================
// Book Contract
// ============================================================================

/// Operations shared by every order book realization.
///
/// All methods take and return values; nothing hands out references into
/// internal state.
pub trait OrderBook: Send + Sync {
    /// Match a buy order against the asks and rest any remainder on the bids.
    ///
    /// # Returns
    /// Fills in the order they happened (best ask first).
    fn submit_buy(&self, order: Order) -> BookResult<Vec<Trade>>;

    /// Match a sell order against the bids and rest any remainder on the asks.
    fn submit_sell(&self, order: Order) -> BookResult<Vec<Trade>>;

    /// Highest priority resting buy order
    fn best_bid(&self) -> Option<Order>;

    /// Highest priority resting sell order
    fn best_ask(&self) -> Option<Order>;

    /// Total resting buy quantity at `price` (0 if none)
    fn quantity_at_bid(&self, price: u64) -> u64;

    /// Total resting sell quantity at `price` (0 if none)
    fn quantity_at_ask(&self, price: u64) -> u64;

    /// Number of resting orders on `side`
    fn order_count(&self, side: Side) -> usize;

    /// Resting orders on `side`, best first.
    fn resting(&self, side: Side) -> Vec<Order>;

    /// Submit on the side named by the submission.
    fn submit(&self, submission: Submission) -> BookResult<Vec<Trade>> {
        match submission.side {
            Side::Bid => self.submit_buy(submission.order()),
            Side::Ask => self.submit_sell(submission.order()),
        }
    }

    /// Total resting quantity at `price` on `side`
    fn quantity_at(&self, side: Side, price: u64) -> u64 {
        match side {
            Side::Bid => self.quantity_at_bid(price),
            Side::Ask => self.quantity_at_ask(price),
        }
    }

    /// Calculate spread (best_ask - best_bid)
    fn spread(&self) -> Option<u64> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) if ask.price > bid.price => Some(ask.price - bid.price),
            _ => None,
        }
    }

    /// Check if the book is empty
    fn is_empty(&self) -> bool {
        self.order_count(Side::Bid) == 0 && self.order_count(Side::Ask) == 0
    }
}

// ============================================================================
// Storage Strategy
// ============================================================================

/// Priority-ordered storage for the resting orders of one side.
///
/// Implementations only store; aggregate bookkeeping and the matching loop
/// live in [`SideBook`] and [`crate::matching`].
pub trait RestingOrders: Send + Sync {
    /// Ordering rules for the side this store holds
    type Policy: Priority;

    /// Create an empty store sized for roughly `orders` resting orders.
    fn with_capacity(orders: usize) -> Self
    where
        Self: Sized;

    /// The highest priority order, if any.
    fn peek(&self) -> Option<&Order>;

    /// Remove and return the highest priority order.
    fn pop(&mut self) -> Option<Order>;

    /// Reduce the quantity of the highest priority order by `qty`.
    ///
    /// The caller guarantees `qty` is strictly less than that order's
    /// quantity, so the order keeps resting.
    fn reduce_top(&mut self, qty: u64);

    /// Add a new resting order.
    fn insert(&mut self, order: Order);

    /// Number of resting orders
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of all resting orders, best first.
    fn orders(&self) -> Vec<Order>;

    /// Remove all orders
    fn clear(&mut self);
}

/// One side of the book: resting orders plus their per-price totals.
///
/// Invariant: for every price `p`, `volume.get(p)` equals the summed
/// quantity of the orders in `orders` at `p`.
#[derive(Debug)]
pub struct SideBook<S> {
    pub(crate) orders: S,
    pub(crate) volume: AggregateQuantity,
}

impl<S: RestingOrders> SideBook<S> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(orders: usize) -> Self {
        Self {
            orders: S::with_capacity(orders),
            volume: AggregateQuantity::with_capacity(S::Policy::SIDE, orders.min(1024)),
        }
    }

    /// The side this book holds
    #[inline]
    pub fn side(&self) -> Side {
        S::Policy::SIDE
    }

    /// Copy of the highest priority order
    #[inline]
    pub fn best(&self) -> Option<Order> {
        self.orders.peek().copied()
    }

    /// Aggregate lookup
    #[inline]
    pub fn quantity_at(&self, price: u64) -> u64 {
        self.volume.get(price)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// The underlying store
    #[inline]
    pub fn store(&self) -> &S {
        &self.orders
    }

    /// The aggregate map
    #[inline]
    pub fn volume(&self) -> &AggregateQuantity {
        &self.volume
    }

    pub fn clear(&mut self) {
        self.orders.clear();
        self.volume.clear();
    }
}

impl<S: RestingOrders> Default for SideBook<S> {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Locked Book
// ============================================================================

/// A limit order book with one lock per side.
///
/// `B` stores the bids and `A` the asks. The concrete realizations are
/// [`crate::HeapOrderBook`] and [`crate::LevelOrderBook`].
pub struct LimitOrderBook<B, A> {
    bids: RwLock<SideBook<B>>,
    asks: RwLock<SideBook<A>>,
}

impl<B, A> LimitOrderBook<B, A>
where
    B: RestingOrders<Policy = Bids>,
    A: RestingOrders<Policy = Asks>,
{
    /// Create a new empty order book
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create a new order book with storage pre-allocated per side
    pub fn with_capacity(orders: usize) -> Self {
        Self {
            bids: RwLock::new(SideBook::with_capacity(orders)),
            asks: RwLock::new(SideBook::with_capacity(orders)),
        }
    }

    /// Run `f` with the bid side read-locked.
    pub fn with_bids<R>(&self, f: impl FnOnce(&SideBook<B>) -> R) -> R {
        f(&self.bids.read())
    }

    /// Run `f` with the ask side read-locked.
    pub fn with_asks<R>(&self, f: impl FnOnce(&SideBook<A>) -> R) -> R {
        f(&self.asks.read())
    }

    /// Clear all orders from the book
    pub fn clear(&self) {
        self.bids.write().clear();
        self.asks.write().clear();
    }
}

impl<B, A> Default for LimitOrderBook<B, A>
where
    B: RestingOrders<Policy = Bids>,
    A: RestingOrders<Policy = Asks>,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<B, A> std::fmt::Debug for LimitOrderBook<B, A>
where
    B: RestingOrders<Policy = Bids>,
    A: RestingOrders<Policy = Asks>,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let bids = self.bids.read();
        let asks = self.asks.read();
        f.debug_struct("LimitOrderBook")
            .field("best_bid", &bids.best())
            .field("best_ask", &asks.best())
            .field("bid_orders", &bids.len())
            .field("ask_orders", &asks.len())
            .finish()
    }
}

/// Cross `order` against `opposite`, then rest the remainder on `own`.
fn submit_to<O, M>(
    own: &RwLock<SideBook<O>>,
    opposite: &RwLock<SideBook<M>>,
    mut order: Order,
) -> BookResult<Vec<Trade>>
where
    O: RestingOrders,
    M: RestingOrders,
{
    let side = O::Policy::SIDE;
    if order.quantity == 0 {
        debug!(%side, price = order.price, timestamp = order.timestamp, "ignoring zero quantity order");
        return Ok(Vec::new());
    }
    let submitted = order.quantity;

    // Phase 1: CROSSING
    let trades = {
        let mut opposite = opposite.write();
        cross_order(&mut order, &mut *opposite)
    };

    // Phase 2: RESTING
    if order.quantity > 0 {
        let mut own = own.write();
        if let Err(err) = rest_order(order, &mut *own) {
            return Err(match err {
                BookError::QuantityOverflow {
                    side,
                    price,
                    resting,
                    incoming,
                    ..
                } => BookError::QuantityOverflow {
                    side,
                    price,
                    resting,
                    incoming,
                    executed: trades,
                },
            });
        }
    }

    debug!(
        %side,
        price = order.price,
        submitted,
        fills = trades.len(),
        rested = order.quantity,
        "order submitted"
    );
    Ok(trades)
}

impl<B, A> OrderBook for LimitOrderBook<B, A>
where
    B: RestingOrders<Policy = Bids>,
    A: RestingOrders<Policy = Asks>,
{
    fn submit_buy(&self, order: Order) -> BookResult<Vec<Trade>> {
        submit_to(&self.bids, &self.asks, order)
    }

    fn submit_sell(&self, order: Order) -> BookResult<Vec<Trade>> {
        submit_to(&self.asks, &self.bids, order)
    }

    fn best_bid(&self) -> Option<Order> {
        self.bids.read().best()
    }

    fn best_ask(&self) -> Option<Order> {
        self.asks.read().best()
    }

    fn quantity_at_bid(&self, price: u64) -> u64 {
        self.bids.read().quantity_at(price)
    }

    fn quantity_at_ask(&self, price: u64) -> u64 {
        self.asks.read().quantity_at(price)
    }

    fn order_count(&self, side: Side) -> usize {
        match side {
            Side::Bid => self.bids.read().len(),
            Side::Ask => self.asks.read().len(),
        }
    }

    fn resting(&self, side: Side) -> Vec<Order> {
        match side {
            Side::Bid => self.bids.read().orders.orders(),
            Side::Ask => self.asks.read().orders.orders(),
        }
    }
}
