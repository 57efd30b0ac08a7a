//! Catalog records and their write payloads.

use chrono::{DateTime, Utc};
use common::{CategoryId, Money, ProductId};
use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, Result};

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A sellable product.
///
/// `stock` is never negative once a write has been accepted by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Money,
    #[serde(rename = "category")]
    pub category_id: CategoryId,
    pub stock: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating a category.
#[derive(Debug, Clone, Deserialize)]
pub struct NewCategory {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl NewCategory {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        validate_name(&self.name)
    }
}

/// Partial update of a category; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl CategoryUpdate {
    pub(crate) fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        Ok(())
    }
}

/// Payload for creating a product.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Money,
    #[serde(rename = "category")]
    pub category_id: CategoryId,
    #[serde(default)]
    pub stock: i64,
}

impl NewProduct {
    pub fn new(
        name: impl Into<String>,
        price: Money,
        category_id: CategoryId,
        stock: i64,
    ) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            price,
            category_id,
            stock,
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        validate_name(&self.name)?;
        validate_price(self.price)?;
        validate_stock(self.stock)
    }
}

/// Partial update of a product; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Money>,
    #[serde(rename = "category")]
    pub category_id: Option<CategoryId>,
    pub stock: Option<i64>,
}

impl ProductUpdate {
    pub(crate) fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(price) = self.price {
            validate_price(price)?;
        }
        if let Some(stock) = self.stock {
            validate_stock(stock)?;
        }
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(CatalogError::Validation("name must not be blank".to_string()));
    }
    Ok(())
}

fn validate_price(price: Money) -> Result<()> {
    if price.is_negative() {
        return Err(CatalogError::Validation(format!(
            "price must not be negative, got {price}"
        )));
    }
    if !price.is_within_limit() {
        return Err(CatalogError::Validation(format!(
            "price must not exceed {}, got {price}",
            Money::MAX
        )));
    }
    Ok(())
}

pub(crate) fn validate_stock(stock: i64) -> Result<()> {
    if stock < 0 {
        return Err(CatalogError::Validation(format!(
            "stock must not be negative, got {stock}"
        )));
    }
    Ok(())
}
