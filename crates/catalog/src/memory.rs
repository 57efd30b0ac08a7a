use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use common::{CategoryId, ProductId};
use tokio::sync::RwLock;

use crate::error::{CatalogError, Result};
use crate::model::{
    Category, CategoryUpdate, NewCategory, NewProduct, Product, ProductUpdate, validate_stock,
};
use crate::store::CatalogStore;

#[derive(Debug, Default)]
struct CatalogState {
    categories: BTreeMap<CategoryId, Category>,
    products: BTreeMap<ProductId, Product>,
    next_category_id: i64,
    next_product_id: i64,
}

impl CatalogState {
    fn product_mut(&mut self, id: ProductId) -> Result<&mut Product> {
        self.products
            .get_mut(&id)
            .ok_or(CatalogError::ProductNotFound(id))
    }

    fn ensure_category(&self, id: CategoryId) -> Result<()> {
        if self.categories.contains_key(&id) {
            Ok(())
        } else {
            Err(CatalogError::CategoryNotFound(id))
        }
    }
}

/// In-memory catalog store.
///
/// Ids are assigned sequentially starting at 1. Clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalogStore {
    state: Arc<RwLock<CatalogState>>,
}

impl InMemoryCatalogStore {
    /// Creates a new empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of products stored.
    pub async fn product_count(&self) -> usize {
        self.state.read().await.products.len()
    }
}

fn validate_amount(amount: i64) -> Result<()> {
    if amount < 1 {
        return Err(CatalogError::Validation(format!(
            "stock adjustment must be at least 1, got {amount}"
        )));
    }
    Ok(())
}

#[async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn list_categories(&self) -> Result<Vec<Category>> {
        Ok(self.state.read().await.categories.values().cloned().collect())
    }

    async fn get_category(&self, id: CategoryId) -> Result<Category> {
        self.state
            .read()
            .await
            .categories
            .get(&id)
            .cloned()
            .ok_or(CatalogError::CategoryNotFound(id))
    }

    async fn create_category(&self, category: NewCategory) -> Result<Category> {
        category.validate()?;
        let mut state = self.state.write().await;
        state.next_category_id += 1;
        let now = Utc::now();
        let created = Category {
            id: CategoryId::new(state.next_category_id),
            name: category.name,
            description: category.description,
            created_at: now,
            updated_at: now,
        };
        state.categories.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update_category(&self, id: CategoryId, update: CategoryUpdate) -> Result<Category> {
        update.validate()?;
        let mut state = self.state.write().await;
        let category = state
            .categories
            .get_mut(&id)
            .ok_or(CatalogError::CategoryNotFound(id))?;
        if let Some(name) = update.name {
            category.name = name;
        }
        if let Some(description) = update.description {
            category.description = description;
        }
        category.updated_at = Utc::now();
        Ok(category.clone())
    }

    async fn delete_category(&self, id: CategoryId) -> Result<()> {
        let mut state = self.state.write().await;
        state
            .categories
            .remove(&id)
            .ok_or(CatalogError::CategoryNotFound(id))?;
        state.products.retain(|_, p| p.category_id != id);
        Ok(())
    }

    async fn list_products(&self, category: Option<CategoryId>) -> Result<Vec<Product>> {
        let state = self.state.read().await;
        match category {
            Some(category_id) => {
                state.ensure_category(category_id)?;
                Ok(state
                    .products
                    .values()
                    .filter(|p| p.category_id == category_id)
                    .cloned()
                    .collect())
            }
            None => Ok(state.products.values().cloned().collect()),
        }
    }

    async fn get_product(&self, id: ProductId) -> Result<Product> {
        self.state
            .read()
            .await
            .products
            .get(&id)
            .cloned()
            .ok_or(CatalogError::ProductNotFound(id))
    }

    async fn create_product(&self, product: NewProduct) -> Result<Product> {
        product.validate()?;
        let mut state = self.state.write().await;
        state.ensure_category(product.category_id)?;
        state.next_product_id += 1;
        let now = Utc::now();
        let created = Product {
            id: ProductId::new(state.next_product_id),
            name: product.name,
            description: product.description,
            price: product.price,
            category_id: product.category_id,
            stock: product.stock,
            created_at: now,
            updated_at: now,
        };
        state.products.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update_product(&self, id: ProductId, update: ProductUpdate) -> Result<Product> {
        update.validate()?;
        let mut state = self.state.write().await;
        if let Some(category_id) = update.category_id {
            state.ensure_category(category_id)?;
        }
        let product = state.product_mut(id)?;
        if let Some(name) = update.name {
            product.name = name;
        }
        if let Some(description) = update.description {
            product.description = description;
        }
        if let Some(price) = update.price {
            product.price = price;
        }
        if let Some(category_id) = update.category_id {
            product.category_id = category_id;
        }
        if let Some(stock) = update.stock {
            product.stock = stock;
        }
        product.updated_at = Utc::now();
        Ok(product.clone())
    }

    async fn delete_product(&self, id: ProductId) -> Result<()> {
        self.state
            .write()
            .await
            .products
            .remove(&id)
            .map(|_| ())
            .ok_or(CatalogError::ProductNotFound(id))
    }

    #[tracing::instrument(skip(self))]
    async fn set_stock(&self, id: ProductId, stock: i64) -> Result<Product> {
        validate_stock(stock)?;
        let mut state = self.state.write().await;
        let product = state.product_mut(id)?;
        product.stock = stock;
        product.updated_at = Utc::now();
        metrics::counter!("catalog_stock_writes_total", "kind" => "overwrite").increment(1);
        Ok(product.clone())
    }

    #[tracing::instrument(skip(self))]
    async fn decrement_stock_if_available(&self, id: ProductId, amount: i64) -> Result<Product> {
        validate_amount(amount)?;
        let mut state = self.state.write().await;
        let product = state.product_mut(id)?;
        if product.stock < amount {
            return Err(CatalogError::InsufficientStock {
                product_id: id,
                available: product.stock,
                requested: amount,
            });
        }
        product.stock -= amount;
        product.updated_at = Utc::now();
        metrics::counter!("catalog_stock_writes_total", "kind" => "decrement").increment(1);
        Ok(product.clone())
    }

    #[tracing::instrument(skip(self))]
    async fn increment_stock(&self, id: ProductId, amount: i64) -> Result<Product> {
        validate_amount(amount)?;
        let mut state = self.state.write().await;
        let product = state.product_mut(id)?;
        product.stock = product.stock.checked_add(amount).ok_or_else(|| {
            CatalogError::Validation(format!(
                "stock for product {id} cannot grow past {}",
                i64::MAX
            ))
        })?;
        product.updated_at = Utc::now();
        metrics::counter!("catalog_stock_writes_total", "kind" => "increment").increment(1);
        Ok(product.clone())
    }
}
