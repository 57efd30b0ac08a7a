use async_trait::async_trait;
use common::{CartItemId, UserId};

use crate::error::Result;
use crate::model::{AddItem, Cart, CartLineItem};

/// Core trait for cart storage.
///
/// Every operation is scoped to the owning user; a line item id from another
/// user's cart is reported as not found.
#[async_trait]
pub trait CartStore: Send + Sync {
    /// Returns the user's cart, creating an empty one if needed.
    async fn get_or_create_cart(&self, user_id: UserId) -> Result<Cart>;

    /// Adds a product to the cart or increases its quantity.
    ///
    /// When the product is already present, only the quantity changes; the
    /// stored price snapshot is kept.
    async fn add_item(&self, user_id: UserId, item: AddItem) -> Result<CartLineItem>;

    /// Replaces the quantity of a line item.
    async fn update_item_quantity(
        &self,
        user_id: UserId,
        item_id: CartItemId,
        quantity: i64,
    ) -> Result<CartLineItem>;

    /// Removes a single line item.
    async fn remove_item(&self, user_id: UserId, item_id: CartItemId) -> Result<()>;

    /// Removes every line item from the user's cart.
    ///
    /// Succeeds even if the user has no cart yet; returns whether one existed.
    async fn clear(&self, user_id: UserId) -> Result<bool>;
}
