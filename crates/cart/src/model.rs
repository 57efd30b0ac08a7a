//! Cart records.

use chrono::{DateTime, Utc};
use common::{CartItemId, Money, ProductId, UserId};
use serde::{Deserialize, Serialize};

use crate::error::{CartError, Result};

/// A user's cart with its line items, most recently added first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    pub id: i64,
    pub user_id: UserId,
    pub items: Vec<CartLineItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    /// Returns the sum of all line item quantities.
    pub fn total_items(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }

    /// Returns the sum of all line item totals.
    pub fn total_price(&self) -> Money {
        self.items.iter().map(CartLineItem::total).sum()
    }

    /// Returns true if the cart holds no line items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// One product in a cart.
///
/// `price` is the unit price observed when the product was first added; it
/// is not refreshed from the catalog afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineItem {
    pub id: CartItemId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub price: Money,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CartLineItem {
    /// Returns the line total (quantity * price).
    pub fn total(&self) -> Money {
        self.price.multiply(self.quantity)
    }
}

/// Request to add a product to a cart.
///
/// Fields are optional so that missing values surface as validation errors
/// rather than deserialization failures.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddItem {
    pub product_id: Option<ProductId>,
    pub quantity: Option<i64>,
    pub price: Option<Money>,
}

impl AddItem {
    pub fn new(product_id: ProductId, quantity: i64, price: Money) -> Self {
        Self {
            product_id: Some(product_id),
            quantity: Some(quantity),
            price: Some(price),
        }
    }

    /// Checks the request and returns `(product_id, quantity, price)`.
    ///
    /// A missing quantity defaults to 1.
    pub fn validate(&self) -> Result<(ProductId, u32, Money)> {
        let (Some(product_id), Some(price)) = (self.product_id, self.price) else {
            return Err(CartError::Validation(
                "product_id and price are required".to_string(),
            ));
        };
        let quantity = validate_quantity(self.quantity.unwrap_or(1))?;
        if price.is_negative() {
            return Err(CartError::Validation(format!(
                "price must not be negative, got {price}"
            )));
        }
        if !price.is_within_limit() {
            return Err(CartError::Validation(format!(
                "price must not exceed {}, got {price}",
                Money::MAX
            )));
        }
        validate_line_total(price, quantity)?;
        Ok((product_id, quantity, price))
    }
}

/// Checks that `price * quantity` stays within [`Money::MAX`].
pub fn validate_line_total(price: Money, quantity: u32) -> Result<Money> {
    price
        .checked_multiply(quantity)
        .filter(Money::is_within_limit)
        .ok_or_else(|| {
            CartError::Validation(format!(
                "line total for {quantity} x {price} exceeds {}",
                Money::MAX
            ))
        })
}

/// Checks that a requested quantity is at least 1 and fits a line item.
pub fn validate_quantity(quantity: i64) -> Result<u32> {
    if quantity < 1 {
        return Err(CartError::Validation(format!(
            "quantity must be at least 1, got {quantity}"
        )));
    }
    u32::try_from(quantity)
        .map_err(|_| CartError::Validation(format!("quantity {quantity} is too large")))
}
