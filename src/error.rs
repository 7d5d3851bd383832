//! Error types for book operations.

use thiserror::Error;

use crate::order::{Side, Trade};

/// Errors reported by a submission.
///
/// Matching itself cannot fail; the only reportable condition is an
/// aggregate counter that would overflow when the remainder is rested.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookError {
    /// Resting the remainder would overflow the aggregate quantity at `price`.
    ///
    /// The remainder was not rested. Fills produced before the overflow was
    /// detected already happened and are carried in `executed`.
    #[error("aggregate quantity overflow on {side} side at price {price}: {resting} resting + {incoming} incoming")]
    QuantityOverflow {
        side: Side,
        price: u64,
        resting: u64,
        incoming: u64,
        executed: Vec<Trade>,
    },
}

/// Result alias for book operations
pub type BookResult<T> = Result<T, BookError>;
