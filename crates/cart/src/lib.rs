//! Shopping carts, one per user.
//!
//! A cart is created lazily the first time its owner reads or writes it.
//! Line items are unique per product: adding a product that is already in
//! the cart increases its quantity and keeps the price captured the first
//! time it was added.

pub mod error;
pub mod memory;
pub mod model;
pub mod store;

pub use error::CartError;
pub use memory::InMemoryCartStore;
pub use model::{AddItem, Cart, CartLineItem, validate_line_total};
pub use store::CartStore;
