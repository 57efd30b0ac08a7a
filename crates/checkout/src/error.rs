//! Workflow error types.

use common::{Money, OrderId, ProductId};
use orders::{OrderError, OrderStatus};
use thiserror::Error;

/// Errors reported by a cart or catalog collaborator.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The requested entity does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The collaborator refused the forwarded credential.
    #[error("Unauthorized")]
    Unauthorized,

    /// A conditional decrement found too little stock.
    #[error("Insufficient stock for product {0}")]
    InsufficientStock(ProductId),

    /// The collaborator did not answer within the timeout.
    #[error("Request timed out")]
    Timeout,

    /// The collaborator was unreachable or answered unexpectedly.
    #[error("Upstream error: {0}")]
    Upstream(String),
}

impl ServiceError {
    /// Maps a non-success HTTP status to an error.
    pub(crate) fn from_status(status: reqwest::StatusCode, what: &str) -> Self {
        match status {
            reqwest::StatusCode::NOT_FOUND => ServiceError::NotFound(what.to_string()),
            reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
                ServiceError::Unauthorized
            }
            other => ServiceError::Upstream(format!("{what}: responded with status {other}")),
        }
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ServiceError::Timeout
        } else {
            ServiceError::Upstream(err.to_string())
        }
    }
}

/// Errors that abort an order workflow operation.
///
/// Failures after an order has been committed are never reported here; they
/// surface as warnings on the successful outcome instead.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// The caller's cart has no line items.
    #[error("Cart is empty")]
    EmptyCart,

    /// A product in the cart could not be found in the catalog.
    #[error("Product {0} not found")]
    ProductNotFound(ProductId),

    /// A product in the cart has less stock than requested.
    #[error("{product_name} has insufficient stock. Available: {available}")]
    InsufficientStock {
        product_id: ProductId,
        product_name: String,
        available: i64,
        requested: u32,
    },

    /// The order does not exist or is not visible to the caller.
    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    /// The order total would exceed the largest supported amount.
    #[error("Order total exceeds {}", Money::MAX)]
    AmountTooLarge,

    /// The order's current status does not allow the requested change.
    #[error("Order cannot move from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    /// The requested status is not a recognized value.
    #[error("Invalid status: {0:?}")]
    InvalidStatus(String),

    /// The caller lacks the required role.
    #[error("{0}")]
    Forbidden(String),

    /// A uniqueness constraint was violated.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A collaborator failed before anything was committed.
    #[error("Upstream service error: {0}")]
    Upstream(String),

    /// A collaborator timed out before anything was committed.
    #[error("Upstream service timed out")]
    Timeout,

    /// The order store failed.
    #[error("Order store error: {0}")]
    Store(String),
}

impl WorkflowError {
    /// Short machine-readable label, used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            WorkflowError::EmptyCart => "empty_cart",
            WorkflowError::ProductNotFound(_) => "product_not_found",
            WorkflowError::InsufficientStock { .. } => "insufficient_stock",
            WorkflowError::AmountTooLarge => "amount_too_large",
            WorkflowError::OrderNotFound(_) => "order_not_found",
            WorkflowError::InvalidTransition { .. } => "invalid_transition",
            WorkflowError::InvalidStatus(_) => "invalid_status",
            WorkflowError::Forbidden(_) => "forbidden",
            WorkflowError::Conflict(_) => "conflict",
            WorkflowError::Upstream(_) => "upstream",
            WorkflowError::Timeout => "timeout",
            WorkflowError::Store(_) => "store",
        }
    }
}

impl From<OrderError> for WorkflowError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::NotFound(id) => WorkflowError::OrderNotFound(id),
            OrderError::InvalidStatus(s) => WorkflowError::InvalidStatus(s),
            OrderError::Conflict(msg) => WorkflowError::Conflict(msg),
            OrderError::NoItems => WorkflowError::EmptyCart,
        }
    }
}

impl From<ServiceError> for WorkflowError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Timeout => WorkflowError::Timeout,
            other => WorkflowError::Upstream(other.to_string()),
        }
    }
}

/// Convenience type alias for workflow results.
pub type Result<T> = std::result::Result<T, WorkflowError>;
