//! Collaborators the order workflow depends on.
//!
//! Each collaborator has an HTTP implementation for talking to a separately
//! deployed service and a local implementation over an in-process store.

pub mod cart;
pub mod catalog;

pub use cart::{CartItemSnapshot, CartService, CartSnapshot, HttpCartService, LocalCartService};
pub use catalog::{CatalogService, HttpCatalogService, LocalCatalogService, ProductSnapshot};
