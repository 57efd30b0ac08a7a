//! Order endpoints backed by the order workflow.

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use checkout::{CreateOrderOutcome, StatusChangeOutcome};
use common::OrderId;
use orders::{CheckoutDetails, Order};
use serde::Deserialize;

use crate::auth::Authenticated;
use crate::error::ApiError;
use crate::state::OrdersState;

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: Option<String>,
}

/// POST /api/orders/create: check out the caller's cart.
///
/// The body carries optional delivery details; an empty body uses defaults.
#[tracing::instrument(skip_all, fields(user_id = %caller.identity.id))]
pub async fn create(
    State(state): State<OrdersState>,
    Authenticated(caller): Authenticated,
    body: Bytes,
) -> Result<(StatusCode, Json<CreateOrderOutcome>), ApiError> {
    let details: CheckoutDetails = if body.iter().all(u8::is_ascii_whitespace) {
        CheckoutDetails::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| ApiError::BadRequest(format!("Invalid order details: {e}")))?
    };

    let outcome = state.workflow.create_order(&caller, details).await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

/// GET /api/orders: the caller's orders, newest first.
pub async fn list(
    State(state): State<OrdersState>,
    Authenticated(caller): Authenticated,
) -> Result<Json<Vec<Order>>, ApiError> {
    Ok(Json(state.workflow.list_orders(&caller).await?))
}

/// GET /api/orders/all: every order. Staff only.
pub async fn list_all(
    State(state): State<OrdersState>,
    Authenticated(caller): Authenticated,
) -> Result<Json<Vec<Order>>, ApiError> {
    Ok(Json(state.workflow.list_all_orders(&caller).await?))
}

/// GET /api/orders/{id}
pub async fn get(
    State(state): State<OrdersState>,
    Authenticated(caller): Authenticated,
    Path(id): Path<OrderId>,
) -> Result<Json<Order>, ApiError> {
    Ok(Json(state.workflow.get_order(&caller, id).await?))
}

/// PUT /api/orders/{id}/cancel
#[tracing::instrument(skip_all, fields(user_id = %caller.identity.id, order_id = %id))]
pub async fn cancel(
    State(state): State<OrdersState>,
    Authenticated(caller): Authenticated,
    Path(id): Path<OrderId>,
) -> Result<Json<StatusChangeOutcome>, ApiError> {
    Ok(Json(state.workflow.cancel_order(&caller, id).await?))
}

/// PUT /api/orders/{id}/status: staff-only status change.
#[tracing::instrument(skip_all, fields(user_id = %caller.identity.id, order_id = %id))]
pub async fn update_status(
    State(state): State<OrdersState>,
    Authenticated(caller): Authenticated,
    Path(id): Path<OrderId>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<StatusChangeOutcome>, ApiError> {
    let status = req.status.unwrap_or_default();
    Ok(Json(state.workflow.set_status(&caller, id, &status).await?))
}
