//! Catalog collaborator.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use catalog::{CatalogError, CatalogStore, Product};
use common::{Money, ProductId};
use serde::{Deserialize, Serialize};

use crate::caller::Caller;
use crate::error::ServiceError;

/// The current state of a product as seen by the workflow.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProductSnapshot {
    pub id: ProductId,
    pub name: String,
    pub price: Money,
    pub stock: i64,
}

impl From<Product> for ProductSnapshot {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            price: product.price,
            stock: product.stock,
        }
    }
}

/// Product lookups and stock writes.
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Fetches the current product record.
    async fn get_product(&self, id: ProductId) -> Result<ProductSnapshot, ServiceError>;

    /// Overwrites the product's stock with an absolute value.
    async fn set_stock(
        &self,
        caller: &Caller,
        id: ProductId,
        stock: i64,
    ) -> Result<ProductSnapshot, ServiceError>;

    /// Subtracts `amount` only if that much stock is available.
    async fn decrement_stock_if_available(
        &self,
        caller: &Caller,
        id: ProductId,
        amount: u32,
    ) -> Result<ProductSnapshot, ServiceError>;

    /// Adds `amount` to the stock.
    async fn increment_stock(
        &self,
        caller: &Caller,
        id: ProductId,
        amount: u32,
    ) -> Result<ProductSnapshot, ServiceError>;
}

#[async_trait]
impl<T: CatalogService + ?Sized> CatalogService for Arc<T> {
    async fn get_product(&self, id: ProductId) -> Result<ProductSnapshot, ServiceError> {
        (**self).get_product(id).await
    }

    async fn set_stock(
        &self,
        caller: &Caller,
        id: ProductId,
        stock: i64,
    ) -> Result<ProductSnapshot, ServiceError> {
        (**self).set_stock(caller, id, stock).await
    }

    async fn decrement_stock_if_available(
        &self,
        caller: &Caller,
        id: ProductId,
        amount: u32,
    ) -> Result<ProductSnapshot, ServiceError> {
        (**self)
            .decrement_stock_if_available(caller, id, amount)
            .await
    }

    async fn increment_stock(
        &self,
        caller: &Caller,
        id: ProductId,
        amount: u32,
    ) -> Result<ProductSnapshot, ServiceError> {
        (**self).increment_stock(caller, id, amount).await
    }
}

#[derive(Serialize)]
struct StockBody {
    stock: i64,
}

#[derive(Serialize)]
struct AdjustBody {
    amount: u32,
}

/// Talks to a remote catalog service.
#[derive(Debug, Clone)]
pub struct HttpCatalogService {
    base_url: String,
    client: reqwest::Client,
}

impl HttpCatalogService {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ServiceError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(base_url, client))
    }

    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    fn product_url(&self, id: ProductId) -> String {
        format!("{}/api/products/product/{id}", self.base_url)
    }

    async fn read_product(
        response: reqwest::Response,
        id: ProductId,
    ) -> Result<ProductSnapshot, ServiceError> {
        let status = response.status();
        if status == reqwest::StatusCode::CONFLICT {
            return Err(ServiceError::InsufficientStock(id));
        }
        if !status.is_success() {
            return Err(ServiceError::from_status(status, &format!("product {id}")));
        }
        Ok(response.json().await?)
    }

    async fn adjust(
        &self,
        caller: &Caller,
        id: ProductId,
        direction: &str,
        amount: u32,
    ) -> Result<ProductSnapshot, ServiceError> {
        let response = self
            .client
            .post(format!("{}/stock/{direction}", self.product_url(id)))
            .header(
                reqwest::header::AUTHORIZATION,
                caller.credential.authorization_header(),
            )
            .json(&AdjustBody { amount })
            .send()
            .await?;
        Self::read_product(response, id).await
    }
}

#[async_trait]
impl CatalogService for HttpCatalogService {
    #[tracing::instrument(skip(self))]
    async fn get_product(&self, id: ProductId) -> Result<ProductSnapshot, ServiceError> {
        let response = self.client.get(self.product_url(id)).send().await?;
        Self::read_product(response, id).await
    }

    #[tracing::instrument(skip(self, caller))]
    async fn set_stock(
        &self,
        caller: &Caller,
        id: ProductId,
        stock: i64,
    ) -> Result<ProductSnapshot, ServiceError> {
        let response = self
            .client
            .put(format!("{}/stock", self.product_url(id)))
            .header(
                reqwest::header::AUTHORIZATION,
                caller.credential.authorization_header(),
            )
            .json(&StockBody { stock })
            .send()
            .await?;
        Self::read_product(response, id).await
    }

    #[tracing::instrument(skip(self, caller))]
    async fn decrement_stock_if_available(
        &self,
        caller: &Caller,
        id: ProductId,
        amount: u32,
    ) -> Result<ProductSnapshot, ServiceError> {
        self.adjust(caller, id, "decrement", amount).await
    }

    #[tracing::instrument(skip(self, caller))]
    async fn increment_stock(
        &self,
        caller: &Caller,
        id: ProductId,
        amount: u32,
    ) -> Result<ProductSnapshot, ServiceError> {
        self.adjust(caller, id, "increment", amount).await
    }
}

fn map_catalog_error(err: CatalogError) -> ServiceError {
    match err {
        CatalogError::ProductNotFound(id) => ServiceError::NotFound(format!("product {id}")),
        CatalogError::InsufficientStock { product_id, .. } => {
            ServiceError::InsufficientStock(product_id)
        }
        other => ServiceError::Upstream(other.to_string()),
    }
}

/// Uses a catalog store in the same process.
#[derive(Debug, Clone)]
pub struct LocalCatalogService<S> {
    store: S,
}

impl<S: CatalogStore> LocalCatalogService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S: CatalogStore> CatalogService for LocalCatalogService<S> {
    async fn get_product(&self, id: ProductId) -> Result<ProductSnapshot, ServiceError> {
        self.store
            .get_product(id)
            .await
            .map(ProductSnapshot::from)
            .map_err(map_catalog_error)
    }

    async fn set_stock(
        &self,
        _caller: &Caller,
        id: ProductId,
        stock: i64,
    ) -> Result<ProductSnapshot, ServiceError> {
        self.store
            .set_stock(id, stock)
            .await
            .map(ProductSnapshot::from)
            .map_err(map_catalog_error)
    }

    async fn decrement_stock_if_available(
        &self,
        _caller: &Caller,
        id: ProductId,
        amount: u32,
    ) -> Result<ProductSnapshot, ServiceError> {
        self.store
            .decrement_stock_if_available(id, i64::from(amount))
            .await
            .map(ProductSnapshot::from)
            .map_err(map_catalog_error)
    }

    async fn increment_stock(
        &self,
        _caller: &Caller,
        id: ProductId,
        amount: u32,
    ) -> Result<ProductSnapshot, ServiceError> {
        self.store
            .increment_stock(id, i64::from(amount))
            .await
            .map(ProductSnapshot::from)
            .map_err(map_catalog_error)
    }
}
