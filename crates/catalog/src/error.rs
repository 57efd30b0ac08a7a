//! Catalog error types.

use common::{CategoryId, ProductId};
use thiserror::Error;

/// Errors that can occur during catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Product does not exist.
    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    /// Category does not exist.
    #[error("Category not found: {0}")]
    CategoryNotFound(CategoryId),

    /// Input failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A conditional decrement found too little stock.
    #[error("Insufficient stock for product {product_id}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: ProductId,
        available: i64,
        requested: i64,
    },
}

/// Convenience type alias for catalog results.
pub type Result<T> = std::result::Result<T, CatalogError>;
