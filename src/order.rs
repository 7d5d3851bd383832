//! Order and Trade value types.
//!
//! Orders are the inputs supplied by the caller (with a caller-assigned
//! timestamp). Trades are the fills returned from a submission.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Order side (bid = buy, ask = sell)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Side {
    /// Buy side (bids)
    #[serde(alias = "buy")]
    Bid = 0,
    /// Sell side (asks)
    #[serde(alias = "sell")]
    Ask = 1,
}

impl Side {
    /// Returns the opposite side
    #[inline]
    pub const fn opposite(self) -> Self {
        match self {
            Side::Bid => Side::Ask,
            Side::Ask => Side::Bid,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Bid => f.write_str("bid"),
            Side::Ask => f.write_str("ask"),
        }
    }
}

// ============================================================================
// Orders
// ============================================================================

/// A limit order.
///
/// Only `quantity` ever changes once an order is in the book, and only while
/// the matching loop holds it. A resting order always has `quantity > 0`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Order {
    /// Limit price in ticks
    pub price: u64,
    /// Remaining quantity in lots
    pub quantity: u64,
    /// Caller-assigned arrival stamp, strictly increasing per book
    pub timestamp: u64,
}

impl Order {
    #[inline]
    pub const fn new(price: u64, quantity: u64, timestamp: u64) -> Self {
        Self {
            price,
            quantity,
            timestamp,
        }
    }
}

/// A fill produced by one step of the matching loop.
///
/// `price` and `timestamp` come from the resting order that supplied the
/// liquidity, never from the incoming order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Trade {
    /// Execution price (the resting order's price)
    pub price: u64,
    /// Executed quantity
    pub quantity: u64,
    /// Timestamp of the resting order
    pub timestamp: u64,
}

impl Trade {
    /// Fill `quantity` against a resting order.
    #[inline]
    pub const fn against(resting: &Order, quantity: u64) -> Self {
        Self {
            price: resting.price,
            quantity,
            timestamp: resting.timestamp,
        }
    }
}

impl From<(u64, u64, u64)> for Trade {
    fn from((price, quantity, timestamp): (u64, u64, u64)) -> Self {
        Self {
            price,
            quantity,
            timestamp,
        }
    }
}

// ============================================================================
// Submissions
// ============================================================================

/// One caller request: an order plus the side it is submitted on.
///
/// Field names match the column headers read by the `replay` tool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub side: Side,
    pub price: u64,
    pub quantity: u64,
    pub timestamp: u64,
}

impl Submission {
    #[inline]
    pub const fn buy(price: u64, quantity: u64, timestamp: u64) -> Self {
        Self {
            side: Side::Bid,
            price,
            quantity,
            timestamp,
        }
    }

    #[inline]
    pub const fn sell(price: u64, quantity: u64, timestamp: u64) -> Self {
        Self {
            side: Side::Ask,
            price,
            quantity,
            timestamp,
        }
    }

    /// The order carried by this submission
    #[inline]
    pub const fn order(&self) -> Order {
        Order::new(self.price, self.quantity, self.timestamp)
    }
}
