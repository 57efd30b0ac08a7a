//! Order workflow for the storefront.
//!
//! [`OrderWorkflow`] turns a customer's cart into an order and drives the
//! order's status afterwards. It talks to the cart and the catalog through
//! the [`CartService`] and [`CatalogService`] traits, which have HTTP and
//! in-process implementations.
//!
//! # Checkout
//!
//! 1. Fetch the cart; an empty cart is refused.
//! 2. Fetch every product and check its stock. Nothing is written yet.
//! 3. Price each line from the cart's price snapshot and add 10% tax.
//! 4. Store the order as `pending`.
//! 5. Take stock for each line (best effort).
//! 6. Clear the cart (best effort).
//!
//! Failures in steps 5 and 6 do not undo the order; they are returned as
//! warnings alongside it.

pub mod caller;
pub mod coordinator;
pub mod error;
pub mod pricing;
pub mod services;
pub mod stock;

pub use caller::Caller;
pub use coordinator::{CreateOrderOutcome, OrderWorkflow, StatusChangeOutcome, WorkflowWarning};
pub use error::{ServiceError, WorkflowError};
pub use pricing::{OrderTotals, TAX_RATE_PERCENT};
pub use services::{
    CartItemSnapshot, CartService, CartSnapshot, CatalogService, HttpCartService,
    HttpCatalogService, LocalCartService, LocalCatalogService, ProductSnapshot,
};
pub use stock::{ParseStockStrategyError, StockStrategy};
