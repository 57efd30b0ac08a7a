use async_trait::async_trait;
use common::{OrderId, UserId};

use crate::error::Result;
use crate::model::{NewOrder, Order};
use crate::state::OrderStatus;

/// Core trait for order storage.
///
/// All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persists an order header and its line items as one unit.
    ///
    /// The new order starts `Pending`. Fails with `Conflict` if the order
    /// number is already taken, in which case nothing is stored.
    async fn insert(&self, order: NewOrder) -> Result<Order>;

    /// Retrieves an order regardless of owner.
    async fn get(&self, id: OrderId) -> Result<Order>;

    /// Retrieves an order only if it belongs to `user_id`.
    async fn get_for_user(&self, id: OrderId, user_id: UserId) -> Result<Order>;

    /// Lists a user's orders, newest first.
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>>;

    /// Lists every order, newest first.
    async fn list_all(&self) -> Result<Vec<Order>>;

    /// Overwrites the status of an order.
    ///
    /// Transition rules are enforced by the caller.
    async fn set_status(&self, id: OrderId, status: OrderStatus) -> Result<Order>;
}
