//! # limit-book
//!
//! A price-time priority limit order matching engine.
//!
//! ## Design Principles
//!
//! - **One Contract, Two Stores**: the [`OrderBook`] trait is realized by a
//!   binary-heap book and a price-level book that produce identical fills
//! - **Shared Matching**: the cross/rest loop is written once against the
//!   [`RestingOrders`] storage trait
//! - **O(1) Volume Queries**: per-side aggregate maps are kept in step with
//!   every fill and every rest
//! - **Per-Side Locking**: each side has its own lock; a submission never
//!   holds both at once
//!
//! ## Architecture
//!
//! ```text
//! submit_buy(order) --> [asks: cross] --> fills
//!                            |
//!                       remainder > 0
//!                            v
//!                       [bids: rest]
//! ```
//!
//! Timestamps are assigned by the caller and must increase strictly per book.

pub mod aggregate;
pub mod book;
pub mod engine;
pub mod error;
pub mod heap_book;
pub mod level_book;
pub mod matching;
pub mod order;
pub mod priority;

// Re-exports for convenience
pub use aggregate::AggregateQuantity;
pub use book::{LimitOrderBook, OrderBook, RestingOrders, SideBook};
pub use engine::{Engine, EngineKind};
pub use error::{BookError, BookResult};
pub use heap_book::{HeapOrderBook, HeapSide};
pub use level_book::{LevelOrderBook, LevelSide, PriceLevel};
pub use order::{Order, Side, Submission, Trade};
pub use priority::{Asks, Bids, Priority};
