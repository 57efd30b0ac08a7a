//! Cart collaborator.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use cart::{Cart, CartStore};
use common::{Money, ProductId};
use serde::Deserialize;

use crate::caller::Caller;
use crate::error::ServiceError;

/// One line of the caller's cart as seen by the workflow.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CartItemSnapshot {
    pub product_id: ProductId,
    pub quantity: u32,
    /// Unit price captured when the item was added to the cart.
    pub price: Money,
}

/// The caller's cart as seen by the workflow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CartSnapshot {
    #[serde(default)]
    pub items: Vec<CartItemSnapshot>,
}

impl From<Cart> for CartSnapshot {
    fn from(cart: Cart) -> Self {
        Self {
            items: cart
                .items
                .into_iter()
                .map(|item| CartItemSnapshot {
                    product_id: item.product_id,
                    quantity: item.quantity,
                    price: item.price,
                })
                .collect(),
        }
    }
}

/// Access to the caller's cart.
#[async_trait]
pub trait CartService: Send + Sync {
    /// Fetches the caller's cart.
    async fn fetch_cart(&self, caller: &Caller) -> Result<CartSnapshot, ServiceError>;

    /// Empties the caller's cart. Succeeds if the cart does not exist.
    async fn clear_cart(&self, caller: &Caller) -> Result<(), ServiceError>;
}

#[async_trait]
impl<T: CartService + ?Sized> CartService for Arc<T> {
    async fn fetch_cart(&self, caller: &Caller) -> Result<CartSnapshot, ServiceError> {
        (**self).fetch_cart(caller).await
    }

    async fn clear_cart(&self, caller: &Caller) -> Result<(), ServiceError> {
        (**self).clear_cart(caller).await
    }
}

/// Talks to a remote cart service, forwarding the caller's credential.
#[derive(Debug, Clone)]
pub struct HttpCartService {
    base_url: String,
    client: reqwest::Client,
}

impl HttpCartService {
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
}

#[async_trait]
impl CartService for HttpCartService {
    #[tracing::instrument(skip_all, fields(user_id = %caller.identity.id))]
    async fn fetch_cart(&self, caller: &Caller) -> Result<CartSnapshot, ServiceError> {
        let response = self
            .client
            .get(format!("{}/api/cart", self.base_url))
            .header(
                reqwest::header::AUTHORIZATION,
                caller.credential.authorization_header(),
            )
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::from_status(status, "cart"));
        }
        Ok(response.json().await?)
    }

    #[tracing::instrument(skip_all, fields(user_id = %caller.identity.id))]
    async fn clear_cart(&self, caller: &Caller) -> Result<(), ServiceError> {
        let response = self
            .client
            .delete(format!("{}/api/cart/clear", self.base_url))
            .header(
                reqwest::header::AUTHORIZATION,
                caller.credential.authorization_header(),
            )
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::from_status(status, "cart"));
        }
        Ok(())
    }
}

/// Uses a cart store in the same process.
#[derive(Debug, Clone)]
pub struct LocalCartService<S> {
    store: S,
}

impl<S: CartStore> LocalCartService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S: CartStore> CartService for LocalCartService<S> {
    async fn fetch_cart(&self, caller: &Caller) -> Result<CartSnapshot, ServiceError> {
        self.store
            .get_or_create_cart(caller.identity.id)
            .await
            .map(CartSnapshot::from)
            .map_err(|e| ServiceError::Upstream(e.to_string()))
    }

    async fn clear_cart(&self, caller: &Caller) -> Result<(), ServiceError> {
        self.store
            .clear(caller.identity.id)
            .await
            .map(|_| ())
            .map_err(|e| ServiceError::Upstream(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Json;
    use axum::Router;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::{delete, get};
    use cart::{AddItem, InMemoryCartStore};
    use common::{Credential, Identity, UserId};

    fn caller() -> Caller {
        Caller::new(
            Identity {
                id: UserId::new(7),
                username: "dana".to_string(),
                email: String::new(),
                is_staff: false,
                is_superuser: false,
            },
            Credential::new("secret"),
        )
    }

    async fn spawn(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn authorized(headers: &HeaderMap) -> bool {
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            == Some("Token secret")
    }

    #[tokio::test]
    async fn test_http_fetch_cart_forwards_credential() {
        let router = Router::new().route(
            "/api/cart",
            get(|headers: HeaderMap| async move {
                if !authorized(&headers) {
                    return Err(StatusCode::UNAUTHORIZED);
                }
                Ok(Json(serde_json::json!({
                    "id": 1,
                    "items": [{"id": 4, "product_id": 9, "quantity": 2, "price": "10.00"}],
                    "total_items": 2
                })))
            }),
        );
        let service = HttpCartService::new(spawn(router).await, Duration::from_secs(5)).unwrap();

        let cart = service.fetch_cart(&caller()).await.unwrap();
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].product_id, ProductId::new(9));
        assert_eq!(cart.items[0].quantity, 2);
        assert_eq!(cart.items[0].price.cents(), 1000);

        let mut stranger = caller();
        stranger.credential = Credential::new("other");
        assert!(matches!(
            service.fetch_cart(&stranger).await,
            Err(ServiceError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_http_clear_cart() {
        let router = Router::new().route(
            "/api/cart/clear",
            delete(|| async { Json(serde_json::json!({"message": "Cart cleared"})) }),
        );
        let service = HttpCartService::new(spawn(router).await, Duration::from_secs(5)).unwrap();
        service.clear_cart(&caller()).await.unwrap();
    }

    #[tokio::test]
    async fn test_http_unreachable_is_upstream() {
        let service =
            HttpCartService::new("http://127.0.0.1:1", Duration::from_secs(1)).unwrap();
        assert!(matches!(
            service.fetch_cart(&caller()).await,
            Err(ServiceError::Upstream(_) | ServiceError::Timeout)
        ));
    }

    #[tokio::test]
    async fn test_local_cart_service() {
        let store = InMemoryCartStore::new();
        let service = LocalCartService::new(store.clone());
        let caller = caller();

        assert!(service.fetch_cart(&caller).await.unwrap().items.is_empty());

        store
            .add_item(
                caller.identity.id,
                AddItem::new(ProductId::new(1), 3, Money::from_cents(250)),
            )
            .await
            .unwrap();
        let snapshot = service.fetch_cart(&caller).await.unwrap();
        assert_eq!(snapshot.items[0].quantity, 3);

        service.clear_cart(&caller).await.unwrap();
        assert!(service.fetch_cart(&caller).await.unwrap().items.is_empty());
    }
}
