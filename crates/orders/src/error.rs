//! Order error types.

use common::OrderId;
use thiserror::Error;

/// Errors that can occur in the order store and status handling.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Order does not exist (or is not visible to the caller).
    #[error("Order not found: {0}")]
    NotFound(OrderId),

    /// A status string is not one of the recognized values.
    #[error("Invalid status: {0:?}")]
    InvalidStatus(String),

    /// A uniqueness constraint was violated.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// An order must contain at least one line item.
    #[error("Order has no items")]
    NoItems,
}

/// Convenience type alias for order results.
pub type Result<T> = std::result::Result<T, OrderError>;
