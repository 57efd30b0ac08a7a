use async_trait::async_trait;
use common::{CategoryId, ProductId};

use crate::error::Result;
use crate::model::{Category, CategoryUpdate, NewCategory, NewProduct, Product, ProductUpdate};

/// Core trait for catalog storage.
///
/// All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Lists every category.
    async fn list_categories(&self) -> Result<Vec<Category>>;

    /// Retrieves a single category.
    async fn get_category(&self, id: CategoryId) -> Result<Category>;

    /// Creates a category.
    async fn create_category(&self, category: NewCategory) -> Result<Category>;

    /// Applies a partial update to a category.
    async fn update_category(&self, id: CategoryId, update: CategoryUpdate) -> Result<Category>;

    /// Deletes a category together with its products.
    async fn delete_category(&self, id: CategoryId) -> Result<()>;

    /// Lists products, optionally restricted to one category.
    ///
    /// Fails with `CategoryNotFound` if the filter names an unknown category.
    async fn list_products(&self, category: Option<CategoryId>) -> Result<Vec<Product>>;

    /// Retrieves a single product.
    async fn get_product(&self, id: ProductId) -> Result<Product>;

    /// Creates a product in an existing category.
    async fn create_product(&self, product: NewProduct) -> Result<Product>;

    /// Applies a partial update to a product.
    async fn update_product(&self, id: ProductId, update: ProductUpdate) -> Result<Product>;

    /// Deletes a product.
    async fn delete_product(&self, id: ProductId) -> Result<()>;

    /// Overwrites the stock of a product with an absolute value.
    ///
    /// This is not a delta: callers compute the new value from a stock level
    /// they read earlier, and nothing guards against a concurrent write in
    /// between.
    async fn set_stock(&self, id: ProductId, stock: i64) -> Result<Product>;

    /// Atomically subtracts `amount` from the stock if enough is available.
    ///
    /// Fails with `InsufficientStock` and leaves the product untouched otherwise.
    async fn decrement_stock_if_available(&self, id: ProductId, amount: i64) -> Result<Product>;

    /// Atomically adds `amount` to the stock.
    async fn increment_stock(&self, id: ProductId, amount: i64) -> Result<Product>;
}
