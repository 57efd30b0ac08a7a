use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use common::{CartItemId, UserId};
use tokio::sync::RwLock;

use crate::error::{CartError, Result};
use crate::model::{AddItem, Cart, CartLineItem, validate_line_total, validate_quantity};
use crate::store::CartStore;

#[derive(Debug, Default)]
struct CartState {
    carts: HashMap<UserId, Cart>,
    next_cart_id: i64,
    next_item_id: i64,
}

impl CartState {
    fn cart_mut(&mut self, user_id: UserId) -> &mut Cart {
        let next_cart_id = &mut self.next_cart_id;
        self.carts.entry(user_id).or_insert_with(|| {
            *next_cart_id += 1;
            let now = Utc::now();
            Cart {
                id: *next_cart_id,
                user_id,
                items: Vec::new(),
                created_at: now,
                updated_at: now,
            }
        })
    }

    fn item_mut(&mut self, user_id: UserId, item_id: CartItemId) -> Result<&mut CartLineItem> {
        self.carts
            .get_mut(&user_id)
            .and_then(|cart| cart.items.iter_mut().find(|i| i.id == item_id))
            .ok_or(CartError::ItemNotFound(item_id))
    }
}

/// In-memory cart store.
///
/// Clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCartStore {
    state: Arc<RwLock<CartState>>,
}

impl InMemoryCartStore {
    /// Creates a new empty cart store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of carts that have been created.
    pub async fn cart_count(&self) -> usize {
        self.state.read().await.carts.len()
    }
}

#[async_trait]
impl CartStore for InMemoryCartStore {
    async fn get_or_create_cart(&self, user_id: UserId) -> Result<Cart> {
        if let Some(cart) = self.state.read().await.carts.get(&user_id) {
            return Ok(cart.clone());
        }
        Ok(self.state.write().await.cart_mut(user_id).clone())
    }

    #[tracing::instrument(skip(self))]
    async fn add_item(&self, user_id: UserId, item: AddItem) -> Result<CartLineItem> {
        let (product_id, quantity, price) = item.validate()?;
        let mut state = self.state.write().await;
        state.next_item_id += 1;
        let next_item_id = CartItemId::new(state.next_item_id);
        let now = Utc::now();
        let cart = state.cart_mut(user_id);
        cart.updated_at = now;

        if let Some(existing) = cart.items.iter_mut().find(|i| i.product_id == product_id) {
            let merged = existing.quantity.checked_add(quantity).ok_or_else(|| {
                CartError::Validation(format!("quantity for product {product_id} is too large"))
            })?;
            validate_line_total(existing.price, merged)?;
            existing.quantity = merged;
            existing.updated_at = now;
            metrics::counter!("cart_items_added_total", "merged" => "true").increment(1);
            return Ok(existing.clone());
        }

        let line = CartLineItem {
            id: next_item_id,
            product_id,
            quantity,
            price,
            created_at: now,
            updated_at: now,
        };
        cart.items.insert(0, line.clone());
        metrics::counter!("cart_items_added_total", "merged" => "false").increment(1);
        Ok(line)
    }

    #[tracing::instrument(skip(self))]
    async fn update_item_quantity(
        &self,
        user_id: UserId,
        item_id: CartItemId,
        quantity: i64,
    ) -> Result<CartLineItem> {
        let mut state = self.state.write().await;
        let item = state.item_mut(user_id, item_id)?;
        let quantity = validate_quantity(quantity)?;
        validate_line_total(item.price, quantity)?;
        item.quantity = quantity;
        item.updated_at = Utc::now();
        Ok(item.clone())
    }

    #[tracing::instrument(skip(self))]
    async fn remove_item(&self, user_id: UserId, item_id: CartItemId) -> Result<()> {
        let mut state = self.state.write().await;
        let cart = state
            .carts
            .get_mut(&user_id)
            .ok_or(CartError::ItemNotFound(item_id))?;
        let before = cart.items.len();
        cart.items.retain(|i| i.id != item_id);
        if cart.items.len() == before {
            return Err(CartError::ItemNotFound(item_id));
        }
        cart.updated_at = Utc::now();
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn clear(&self, user_id: UserId) -> Result<bool> {
        let mut state = self.state.write().await;
        match state.carts.get_mut(&user_id) {
            Some(cart) => {
                cart.items.clear();
                cart.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{Money, ProductId};

    const ALICE: UserId = UserId::new(1);
    const BOB: UserId = UserId::new(2);

    #[tokio::test]
    async fn test_get_or_create_is_idempotent() {
        let store = InMemoryCartStore::new();
        let first = store.get_or_create_cart(ALICE).await.unwrap();
        let second = store.get_or_create_cart(ALICE).await.unwrap();
        assert_eq!(first.id, second.id);
        assert!(first.is_empty());
        assert_eq!(store.cart_count().await, 1);
    }

    #[tokio::test]
    async fn test_repeated_add_merges_and_keeps_first_price() {
        let store = InMemoryCartStore::new();
        let product = ProductId::new(10);

        let first = store
            .add_item(ALICE, AddItem::new(product, 2, Money::from_cents(1000)))
            .await
            .unwrap();
        let second = store
            .add_item(ALICE, AddItem::new(product, 3, Money::from_cents(1200)))
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.quantity, 5);
        assert_eq!(second.price, Money::from_cents(1000));

        let cart = store.get_or_create_cart(ALICE).await.unwrap();
        assert_eq!(cart.items.len(), 1);
    }

    #[tokio::test]
    async fn test_items_ordered_most_recent_first() {
        let store = InMemoryCartStore::new();
        store
            .add_item(ALICE, AddItem::new(ProductId::new(1), 1, Money::from_cents(100)))
            .await
            .unwrap();
        store
            .add_item(ALICE, AddItem::new(ProductId::new(2), 1, Money::from_cents(100)))
            .await
            .unwrap();

        let cart = store.get_or_create_cart(ALICE).await.unwrap();
        let products: Vec<_> = cart.items.iter().map(|i| i.product_id).collect();
        assert_eq!(products, vec![ProductId::new(2), ProductId::new(1)]);
    }

    #[tokio::test]
    async fn test_add_rejects_zero_quantity() {
        let store = InMemoryCartStore::new();
        let result = store
            .add_item(ALICE, AddItem::new(ProductId::new(1), 0, Money::from_cents(100)))
            .await;
        assert!(matches!(result, Err(CartError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_quantity_scoped_to_owner() {
        let store = InMemoryCartStore::new();
        let item = store
            .add_item(ALICE, AddItem::new(ProductId::new(1), 1, Money::from_cents(100)))
            .await
            .unwrap();

        let updated = store
            .update_item_quantity(ALICE, item.id, 4)
            .await
            .unwrap();
        assert_eq!(updated.quantity, 4);

        let foreign = store.update_item_quantity(BOB, item.id, 2).await;
        assert!(matches!(foreign, Err(CartError::ItemNotFound(_))));

        let invalid = store.update_item_quantity(ALICE, item.id, 0).await;
        assert!(matches!(invalid, Err(CartError::Validation(_))));
    }

    #[tokio::test]
    async fn test_line_totals_cannot_overflow() {
        let store = InMemoryCartStore::new();
        let huge: Money = "90000000000000000.00".parse().unwrap();
        let rejected = store
            .add_item(ALICE, AddItem::new(ProductId::new(1), 2, huge))
            .await;
        assert!(matches!(rejected, Err(CartError::Validation(_))));

        let item = store
            .add_item(ALICE, AddItem::new(ProductId::new(2), 1, Money::MAX))
            .await
            .unwrap();
        assert_eq!(item.total(), Money::MAX);

        let merged = store
            .add_item(ALICE, AddItem::new(ProductId::new(2), 1, Money::MAX))
            .await;
        assert!(matches!(merged, Err(CartError::Validation(_))));
        let updated = store.update_item_quantity(ALICE, item.id, 2).await;
        assert!(matches!(updated, Err(CartError::Validation(_))));

        let cart = store.get_or_create_cart(ALICE).await.unwrap();
        assert_eq!(cart.items[0].quantity, 1);
        assert_eq!(cart.total_price(), Money::MAX);
    }

    #[tokio::test]
    async fn test_remove_item() {
        let store = InMemoryCartStore::new();
        let item = store
            .add_item(ALICE, AddItem::new(ProductId::new(1), 1, Money::from_cents(100)))
            .await
            .unwrap();

        store.remove_item(ALICE, item.id).await.unwrap();
        assert!(matches!(
            store.remove_item(ALICE, item.id).await,
            Err(CartError::ItemNotFound(_))
        ));
        assert!(store.get_or_create_cart(ALICE).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_clear() {
        let store = InMemoryCartStore::new();
        assert!(!store.clear(ALICE).await.unwrap());

        store
            .add_item(ALICE, AddItem::new(ProductId::new(1), 1, Money::from_cents(100)))
            .await
            .unwrap();
        assert!(store.clear(ALICE).await.unwrap());
        assert!(store.get_or_create_cart(ALICE).await.unwrap().is_empty());
    }
}
