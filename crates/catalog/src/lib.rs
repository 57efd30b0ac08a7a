//! Product catalog for the storefront.
//!
//! Holds categories and products. Besides routine CRUD, the catalog exposes
//! the stock-adjustment operations the order workflow relies on:
//!
//! - [`CatalogStore::set_stock`]: unconditional overwrite with an absolute
//!   value. Callers read, compute and write back, so two concurrent writers
//!   can race.
//! - [`CatalogStore::decrement_stock_if_available`] and
//!   [`CatalogStore::increment_stock`]: atomic adjustments under the store
//!   lock, for deployments that want overselling ruled out.

pub mod error;
pub mod memory;
pub mod model;
pub mod store;

pub use error::CatalogError;
pub use memory::InMemoryCatalogStore;
pub use model::{
    Category, CategoryUpdate, NewCategory, NewProduct, Product, ProductUpdate,
};
pub use store::CatalogStore;
