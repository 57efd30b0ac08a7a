//! Orders for the storefront.
//!
//! This crate provides:
//! - [`OrderStatus`], the order lifecycle state machine
//! - [`Order`] and its immutable [`OrderLineItem`] snapshots
//! - [`OrderNumber`] generation
//! - the [`OrderStore`] trait and an in-memory implementation
//!
//! Creating orders from carts is the job of the checkout workflow; this crate
//! only stores what it is given.

pub mod error;
pub mod memory;
pub mod model;
pub mod number;
pub mod state;
pub mod store;

pub use error::OrderError;
pub use memory::InMemoryOrderStore;
pub use model::{
    CheckoutDetails, DEFAULT_COUNTRY, DEFAULT_PAYMENT_METHOD, DeliveryInfo, NewOrder,
    NewOrderLine, Order, OrderLineItem,
};
pub use number::{ORDER_NUMBER_PREFIX, OrderNumber};
pub use state::OrderStatus;
pub use store::OrderStore;
