use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use common::{OrderId, UserId};
use tokio::sync::RwLock;

use crate::error::{OrderError, Result};
use crate::model::{NewOrder, Order, OrderLineItem};
use crate::state::OrderStatus;
use crate::store::OrderStore;

#[derive(Debug, Default)]
struct OrderState {
    orders: BTreeMap<OrderId, Order>,
    next_order_id: i64,
    next_item_id: i64,
}

/// In-memory order store.
///
/// Ids are assigned sequentially starting at 1. Clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOrderStore {
    state: Arc<RwLock<OrderState>>,
}

impl InMemoryOrderStore {
    /// Creates a new empty order store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of orders stored.
    pub async fn order_count(&self) -> usize {
        self.state.read().await.orders.len()
    }
}

fn newest_first(mut orders: Vec<Order>) -> Vec<Order> {
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    orders
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    #[tracing::instrument(skip(self, order), fields(order_number = %order.order_number))]
    async fn insert(&self, order: NewOrder) -> Result<Order> {
        if order.items.is_empty() {
            return Err(OrderError::NoItems);
        }

        let mut state = self.state.write().await;
        if state
            .orders
            .values()
            .any(|o| o.order_number == order.order_number)
        {
            return Err(OrderError::Conflict(format!(
                "order number {} already exists",
                order.order_number
            )));
        }

        state.next_order_id += 1;
        let id = OrderId::new(state.next_order_id);
        let mut items = Vec::with_capacity(order.items.len());
        for line in order.items {
            state.next_item_id += 1;
            items.push(OrderLineItem {
                id: state.next_item_id,
                subtotal: line.subtotal(),
                product_id: line.product_id,
                product_name: line.product_name,
                quantity: line.quantity,
                price: line.price,
            });
        }

        let now = Utc::now();
        let created = Order {
            id,
            order_number: order.order_number,
            user_id: order.user_id,
            status: OrderStatus::Pending,
            total_amount: order.total_amount,
            tax_amount: order.tax_amount,
            details: order.details,
            items,
            created_at: now,
            updated_at: now,
        };
        state.orders.insert(id, created.clone());
        Ok(created)
    }

    async fn get(&self, id: OrderId) -> Result<Order> {
        self.state
            .read()
            .await
            .orders
            .get(&id)
            .cloned()
            .ok_or(OrderError::NotFound(id))
    }

    async fn get_for_user(&self, id: OrderId, user_id: UserId) -> Result<Order> {
        self.state
            .read()
            .await
            .orders
            .get(&id)
            .filter(|o| o.user_id == user_id)
            .cloned()
            .ok_or(OrderError::NotFound(id))
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>> {
        let orders = self
            .state
            .read()
            .await
            .orders
            .values()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect();
        Ok(newest_first(orders))
    }

    async fn list_all(&self) -> Result<Vec<Order>> {
        let orders = self.state.read().await.orders.values().cloned().collect();
        Ok(newest_first(orders))
    }

    #[tracing::instrument(skip(self))]
    async fn set_status(&self, id: OrderId, status: OrderStatus) -> Result<Order> {
        let mut state = self.state.write().await;
        let order = state.orders.get_mut(&id).ok_or(OrderError::NotFound(id))?;
        order.status = status;
        order.updated_at = Utc::now();
        Ok(order.clone())
    }
}
