//! Shared types for the storefront services.
//!
//! Every service speaks in terms of the same identifiers, the same money
//! representation and the same verified caller identity. Keeping them here
//! lets the cart, catalog and order services exchange JSON without each
//! inventing its own flavour of "product id".

pub mod identity;
pub mod ids;
pub mod money;

pub use identity::{Credential, Identity};
pub use ids::{CartItemId, CategoryId, OrderId, ProductId, UserId};
pub use money::{Money, MoneyParseError};
