//! Matching - the cross/rest algorithm shared by every book realization.
//!
//! 1. CROSSING: consume resting orders on the opposite side while the
//!    incoming price crosses the best resting price and quantity remains
//! 2. RESTING: place any remaining quantity on the incoming order's side
//!
//! Both phases operate on a single [`SideBook`]; the caller holds that
//! side's lock for the duration of the call.

use tracing::trace;

use crate::book::{RestingOrders, SideBook};
use crate::error::BookResult;
use crate::order::{Order, Trade};
use crate::priority::Priority;

/// Check if an incoming order price crosses the best resting price of `S`.
#[inline]
fn prices_cross<S: RestingOrders>(incoming_price: u64, resting_price: u64) -> bool {
    S::Policy::is_marketable(incoming_price, resting_price)
}

/// Cross (match) an incoming order against the opposite side.
///
/// On return `incoming.quantity` holds the unmatched remainder.
///
/// # Returns
/// Fills in match order. Each fill carries the resting order's price and
/// timestamp.
///
/// # Complexity
/// One store removal per fully filled resting order, plus at most one
/// partial fill which ends the loop.
pub fn cross_order<S: RestingOrders>(incoming: &mut Order, resting: &mut SideBook<S>) -> Vec<Trade> {
    let mut trades = Vec::new();

    while incoming.quantity > 0 {
        let Some(top) = resting.orders.peek().copied() else {
            break; // No orders on opposite side
        };

        if !prices_cross::<S>(incoming.price, top.price) {
            break;
        }

        if incoming.quantity < top.quantity {
            // Partial fill: resting order stays, now smaller
            let qty = incoming.quantity;
            trades.push(Trade::against(&top, qty));
            resting.orders.reduce_top(qty);
            resting.volume.remove(top.price, qty);
            incoming.quantity = 0;
            trace!(price = top.price, qty, timestamp = top.timestamp, "partial fill");
            break;
        }

        // Full fill: resting order leaves the book
        let Some(filled) = resting.orders.pop() else {
            break;
        };
        debug_assert_eq!(filled, top);
        trades.push(Trade::against(&filled, filled.quantity));
        resting.volume.remove(filled.price, filled.quantity);
        incoming.quantity -= filled.quantity;
        trace!(
            price = filled.price,
            qty = filled.quantity,
            timestamp = filled.timestamp,
            "full fill"
        );
    }

    trades
}

/// Rest an order in the book (passive posting).
///
/// The aggregate map is updated first; if that would overflow nothing is
/// inserted and the error is returned.
pub fn rest_order<S: RestingOrders>(order: Order, own: &mut SideBook<S>) -> BookResult<()> {
    debug_assert!(order.quantity > 0, "zero quantity orders never rest");
    let level_qty = own.volume.add(order.price, order.quantity)?;
    own.orders.insert(order);
    trace!(
        price = order.price,
        qty = order.quantity,
        timestamp = order.timestamp,
        level_qty,
        "order rested"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heap_book::HeapSide;
    use crate::level_book::LevelSide;
    use crate::priority::{Asks, Bids};

    fn asks_with<S: RestingOrders<Policy = Asks>>(orders: &[(u64, u64, u64)]) -> SideBook<S> {
        let mut side = SideBook::new();
        for &(price, qty, ts) in orders {
            rest_order(Order::new(price, qty, ts), &mut side).unwrap();
        }
        side
    }

    fn check_cross_stops_at_limit<S: RestingOrders<Policy = Asks>>() {
        let mut asks = asks_with::<S>(&[(100, 200, 1), (101, 300, 2), (102, 400, 3)]);
        let mut buy = Order::new(101, 700, 4);

        let trades = cross_order(&mut buy, &mut asks);

        assert_eq!(trades, vec![Trade::from((100, 200, 1)), Trade::from((101, 300, 2))]);
        assert_eq!(buy.quantity, 200);
        assert_eq!(asks.best(), Some(Order::new(102, 400, 3)));
        assert_eq!(asks.quantity_at(100), 0);
        assert_eq!(asks.quantity_at(101), 0);
        assert_eq!(asks.quantity_at(102), 400);
    }

    fn check_partial_fill_keeps_resting<S: RestingOrders<Policy = Asks>>() {
        let mut asks = asks_with::<S>(&[(100, 200, 1), (100, 300, 2)]);
        let mut buy = Order::new(100, 50, 3);

        let trades = cross_order(&mut buy, &mut asks);

        assert_eq!(trades, vec![Trade::from((100, 50, 1))]);
        assert_eq!(buy.quantity, 0);
        assert_eq!(asks.best(), Some(Order::new(100, 150, 1)));
        assert_eq!(asks.quantity_at(100), 450);
        assert_eq!(asks.len(), 2);
    }

    #[test]
    fn test_cross_stops_at_limit_heap() {
        check_cross_stops_at_limit::<HeapSide<Asks>>();
    }

    #[test]
    fn test_cross_stops_at_limit_levels() {
        check_cross_stops_at_limit::<LevelSide<Asks>>();
    }

    #[test]
    fn test_partial_fill_keeps_resting_heap() {
        check_partial_fill_keeps_resting::<HeapSide<Asks>>();
    }

    #[test]
    fn test_partial_fill_keeps_resting_levels() {
        check_partial_fill_keeps_resting::<LevelSide<Asks>>();
    }

    #[test]
    fn test_cross_empty_side() {
        let mut bids: SideBook<LevelSide<Bids>> = SideBook::new();
        let mut sell = Order::new(100, 10, 1);
        assert!(cross_order(&mut sell, &mut bids).is_empty());
        assert_eq!(sell.quantity, 10);
    }

    #[test]
    fn test_rest_updates_aggregate() {
        let mut bids: SideBook<HeapSide<Bids>> = SideBook::new();
        rest_order(Order::new(99, 10, 1), &mut bids).unwrap();
        rest_order(Order::new(99, 15, 2), &mut bids).unwrap();
        assert_eq!(bids.quantity_at(99), 25);
        assert_eq!(bids.len(), 2);
    }

    #[test]
    fn test_rest_overflow_leaves_side_untouched() {
        let mut bids: SideBook<HeapSide<Bids>> = SideBook::new();
        rest_order(Order::new(99, u64::MAX, 1), &mut bids).unwrap();
        assert!(rest_order(Order::new(99, 1, 2), &mut bids).is_err());
        assert_eq!(bids.len(), 1);
        assert_eq!(bids.quantity_at(99), u64::MAX);
    }
}
