//! Cart endpoints. Every route requires an authenticated caller.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use cart::{AddItem, Cart, CartLineItem};
use chrono::{DateTime, Utc};
use common::{CartItemId, Money, ProductId, UserId};
use serde::{Deserialize, Serialize};

use crate::auth::Authenticated;
use crate::error::ApiError;
use crate::state::CartState;

// -- Request types --

#[derive(Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: Option<i64>,
}

// -- Response types --

#[derive(Serialize)]
pub struct CartItemResponse {
    pub id: CartItemId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub price: Money,
    pub total: Money,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CartLineItem> for CartItemResponse {
    fn from(item: CartLineItem) -> Self {
        Self {
            total: item.total(),
            id: item.id,
            product_id: item.product_id,
            quantity: item.quantity,
            price: item.price,
            created_at: item.created_at,
            updated_at: item.updated_at,
        }
    }
}

#[derive(Serialize)]
pub struct CartResponse {
    pub id: i64,
    pub user_id: UserId,
    pub items: Vec<CartItemResponse>,
    pub total_items: u64,
    pub total_price: Money,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Cart> for CartResponse {
    fn from(cart: Cart) -> Self {
        Self {
            total_items: cart.total_items(),
            total_price: cart.total_price(),
            id: cart.id,
            user_id: cart.user_id,
            items: cart.items.into_iter().map(CartItemResponse::from).collect(),
            created_at: cart.created_at,
            updated_at: cart.updated_at,
        }
    }
}

// -- Handlers --

/// GET /api/cart
#[tracing::instrument(skip_all, fields(user_id = %caller.identity.id))]
pub async fn get(
    State(state): State<CartState>,
    Authenticated(caller): Authenticated,
) -> Result<Json<CartResponse>, ApiError> {
    let cart = state.carts.get_or_create_cart(caller.identity.id).await?;
    Ok(Json(cart.into()))
}

/// POST /api/cart/add
#[tracing::instrument(skip_all, fields(user_id = %caller.identity.id))]
pub async fn add(
    State(state): State<CartState>,
    Authenticated(caller): Authenticated,
    Json(req): Json<AddItem>,
) -> Result<(StatusCode, Json<CartItemResponse>), ApiError> {
    let item = state.carts.add_item(caller.identity.id, req).await?;
    Ok((StatusCode::CREATED, Json(item.into())))
}

/// PUT /api/cart/items/{id}
#[tracing::instrument(skip_all, fields(user_id = %caller.identity.id, item_id = %item_id))]
pub async fn update_item(
    State(state): State<CartState>,
    Authenticated(caller): Authenticated,
    Path(item_id): Path<CartItemId>,
    Json(req): Json<UpdateQuantityRequest>,
) -> Result<Json<CartItemResponse>, ApiError> {
    let quantity = req
        .quantity
        .ok_or_else(|| ApiError::BadRequest("Valid quantity is required".to_string()))?;
    let item = state
        .carts
        .update_item_quantity(caller.identity.id, item_id, quantity)
        .await?;
    Ok(Json(item.into()))
}

/// DELETE /api/cart/items/{id}/remove
#[tracing::instrument(skip_all, fields(user_id = %caller.identity.id, item_id = %item_id))]
pub async fn remove_item(
    State(state): State<CartState>,
    Authenticated(caller): Authenticated,
    Path(item_id): Path<CartItemId>,
) -> Result<StatusCode, ApiError> {
    state.carts.remove_item(caller.identity.id, item_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/cart/clear
///
/// Clearing a cart that was never created is not an error.
#[tracing::instrument(skip_all, fields(user_id = %caller.identity.id))]
pub async fn clear(
    State(state): State<CartState>,
    Authenticated(caller): Authenticated,
) -> Result<Response, ApiError> {
    if state.carts.clear(caller.identity.id).await? {
        Ok(StatusCode::NO_CONTENT.into_response())
    } else {
        Ok((
            StatusCode::OK,
            Json(serde_json::json!({ "message": "Cart is already empty" })),
        )
            .into_response())
    }
}
