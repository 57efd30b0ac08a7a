//! Cart error types.

use common::CartItemId;
use thiserror::Error;

/// Errors that can occur during cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// The line item does not exist in the caller's cart.
    #[error("Cart item not found: {0}")]
    ItemNotFound(CartItemId),

    /// Input failed validation.
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Convenience type alias for cart results.
pub type Result<T> = std::result::Result<T, CartError>;
