//! Order records.

use chrono::{DateTime, Utc};
use common::{Money, OrderId, ProductId, UserId};
use serde::{Deserialize, Serialize};

use crate::number::OrderNumber;
use crate::state::OrderStatus;

/// Default payment method when the customer does not pick one.
pub const DEFAULT_PAYMENT_METHOD: &str = "COD";

/// Default delivery country when the customer does not give one.
pub const DEFAULT_COUNTRY: &str = "India";

fn default_country() -> String {
    DEFAULT_COUNTRY.to_string()
}

fn default_payment_method() -> String {
    DEFAULT_PAYMENT_METHOD.to_string()
}

/// Where and how an order should be delivered.
///
/// Field names carry the `delivery_` prefix on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryInfo {
    #[serde(rename = "delivery_name", default)]
    pub name: String,
    #[serde(rename = "delivery_phone", default)]
    pub phone: String,
    #[serde(rename = "delivery_address", default)]
    pub address: String,
    #[serde(rename = "delivery_city", default)]
    pub city: String,
    #[serde(rename = "delivery_state", default)]
    pub state: String,
    #[serde(rename = "delivery_postal_code", default)]
    pub postal_code: String,
    #[serde(rename = "delivery_country", default = "default_country")]
    pub country: String,
    #[serde(rename = "delivery_latitude", default)]
    pub latitude: Option<f64>,
    #[serde(rename = "delivery_longitude", default)]
    pub longitude: Option<f64>,
}

impl Default for DeliveryInfo {
    fn default() -> Self {
        Self {
            name: String::new(),
            phone: String::new(),
            address: String::new(),
            city: String::new(),
            state: String::new(),
            postal_code: String::new(),
            country: default_country(),
            latitude: None,
            longitude: None,
        }
    }
}

/// Checkout details supplied by the customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutDetails {
    #[serde(flatten)]
    pub delivery: DeliveryInfo,
    #[serde(default = "default_payment_method")]
    pub payment_method: String,
}

impl Default for CheckoutDetails {
    fn default() -> Self {
        Self {
            delivery: DeliveryInfo::default(),
            payment_method: default_payment_method(),
        }
    }
}

/// A purchased product, frozen at order time.
///
/// Name and price are snapshots; later catalog edits do not affect them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLineItem {
    pub id: i64,
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: u32,
    pub price: Money,
    pub subtotal: Money,
}

/// An order with its line items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub order_number: OrderNumber,
    pub user_id: UserId,
    pub status: OrderStatus,
    pub total_amount: Money,
    pub tax_amount: Money,
    #[serde(flatten)]
    pub details: CheckoutDetails,
    pub items: Vec<OrderLineItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Returns the sum of the line item subtotals.
    pub fn subtotal(&self) -> Money {
        self.items.iter().map(|i| i.subtotal).sum()
    }
}

/// A line item to be persisted with a new order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderLine {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: u32,
    pub price: Money,
}

impl NewOrderLine {
    /// Returns quantity * price.
    pub fn subtotal(&self) -> Money {
        self.price.multiply(self.quantity)
    }
}

/// An order header plus its line items, persisted as one unit.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub order_number: OrderNumber,
    pub user_id: UserId,
    pub total_amount: Money,
    pub tax_amount: Money,
    pub details: CheckoutDetails,
    pub items: Vec<NewOrderLine>,
}
