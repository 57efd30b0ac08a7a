//! Category and product endpoints.
//!
//! Reads are public. Writes need an authenticated staff or superuser caller,
//! except the stock endpoints which any authenticated caller (in practice the
//! orders service acting for a customer) may use.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use catalog::{Category, CategoryUpdate, NewCategory, NewProduct, Product, ProductUpdate};
use common::{CategoryId, ProductId};
use serde::Deserialize;

use crate::auth::{Authenticated, require_admin};
use crate::error::ApiError;
use crate::state::CatalogState;

// -- Request types --

#[derive(Deserialize)]
pub struct ProductFilter {
    pub category_id: Option<CategoryId>,
}

#[derive(Deserialize)]
pub struct SetStockRequest {
    pub stock: Option<i64>,
}

#[derive(Deserialize)]
pub struct AdjustStockRequest {
    pub amount: i64,
}

// -- Categories --

/// GET /api/products/category
pub async fn list_categories(
    State(state): State<CatalogState>,
) -> Result<Json<Vec<Category>>, ApiError> {
    Ok(Json(state.catalog.list_categories().await?))
}

/// POST /api/products/category
#[tracing::instrument(skip_all, fields(user_id = %caller.identity.id))]
pub async fn create_category(
    State(state): State<CatalogState>,
    Authenticated(caller): Authenticated,
    Json(req): Json<NewCategory>,
) -> Result<(StatusCode, Json<Category>), ApiError> {
    require_admin(&caller, "create categories")?;
    let category = state.catalog.create_category(req).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// GET /api/products/category/{id}
pub async fn get_category(
    State(state): State<CatalogState>,
    Path(id): Path<CategoryId>,
) -> Result<Json<Category>, ApiError> {
    Ok(Json(state.catalog.get_category(id).await?))
}

/// PUT /api/products/category/{id}
#[tracing::instrument(skip_all, fields(user_id = %caller.identity.id, category_id = %id))]
pub async fn update_category(
    State(state): State<CatalogState>,
    Authenticated(caller): Authenticated,
    Path(id): Path<CategoryId>,
    Json(req): Json<CategoryUpdate>,
) -> Result<Json<Category>, ApiError> {
    require_admin(&caller, "update categories")?;
    Ok(Json(state.catalog.update_category(id, req).await?))
}

/// DELETE /api/products/category/{id}
///
/// Removes the category's products as well.
#[tracing::instrument(skip_all, fields(user_id = %caller.identity.id, category_id = %id))]
pub async fn delete_category(
    State(state): State<CatalogState>,
    Authenticated(caller): Authenticated,
    Path(id): Path<CategoryId>,
) -> Result<StatusCode, ApiError> {
    require_admin(&caller, "delete categories")?;
    state.catalog.delete_category(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// -- Products --

/// GET /api/products/product?category_id=
pub async fn list_products(
    State(state): State<CatalogState>,
    Query(filter): Query<ProductFilter>,
) -> Result<Json<Vec<Product>>, ApiError> {
    Ok(Json(state.catalog.list_products(filter.category_id).await?))
}

/// POST /api/products/product
#[tracing::instrument(skip_all, fields(user_id = %caller.identity.id))]
pub async fn create_product(
    State(state): State<CatalogState>,
    Authenticated(caller): Authenticated,
    Json(req): Json<NewProduct>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    require_admin(&caller, "create products")?;
    let product = state.catalog.create_product(req).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// GET /api/products/product/{id}
pub async fn get_product(
    State(state): State<CatalogState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>, ApiError> {
    Ok(Json(state.catalog.get_product(id).await?))
}

/// PUT /api/products/product/{id}
#[tracing::instrument(skip_all, fields(user_id = %caller.identity.id, product_id = %id))]
pub async fn update_product(
    State(state): State<CatalogState>,
    Authenticated(caller): Authenticated,
    Path(id): Path<ProductId>,
    Json(req): Json<ProductUpdate>,
) -> Result<Json<Product>, ApiError> {
    require_admin(&caller, "update products")?;
    Ok(Json(state.catalog.update_product(id, req).await?))
}

/// DELETE /api/products/product/{id}
#[tracing::instrument(skip_all, fields(user_id = %caller.identity.id, product_id = %id))]
pub async fn delete_product(
    State(state): State<CatalogState>,
    Authenticated(caller): Authenticated,
    Path(id): Path<ProductId>,
) -> Result<StatusCode, ApiError> {
    require_admin(&caller, "delete products")?;
    state.catalog.delete_product(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// -- Stock --

/// PUT /api/products/product/{id}/stock
///
/// Overwrites the stock with an absolute value.
#[tracing::instrument(skip_all, fields(user_id = %caller.identity.id, product_id = %id))]
pub async fn set_stock(
    State(state): State<CatalogState>,
    Authenticated(caller): Authenticated,
    Path(id): Path<ProductId>,
    Json(req): Json<SetStockRequest>,
) -> Result<Json<Product>, ApiError> {
    let stock = req
        .stock
        .ok_or_else(|| ApiError::BadRequest("Stock value is required".to_string()))?;
    Ok(Json(state.catalog.set_stock(id, stock).await?))
}

/// POST /api/products/product/{id}/stock/decrement
///
/// Responds 409 if less than `amount` is in stock.
#[tracing::instrument(skip_all, fields(user_id = %caller.identity.id, product_id = %id))]
pub async fn decrement_stock(
    State(state): State<CatalogState>,
    Authenticated(caller): Authenticated,
    Path(id): Path<ProductId>,
    Json(req): Json<AdjustStockRequest>,
) -> Result<Json<Product>, ApiError> {
    Ok(Json(
        state
            .catalog
            .decrement_stock_if_available(id, req.amount)
            .await?,
    ))
}

/// POST /api/products/product/{id}/stock/increment
#[tracing::instrument(skip_all, fields(user_id = %caller.identity.id, product_id = %id))]
pub async fn increment_stock(
    State(state): State<CatalogState>,
    Authenticated(caller): Authenticated,
    Path(id): Path<ProductId>,
    Json(req): Json<AdjustStockRequest>,
) -> Result<Json<Product>, ApiError> {
    Ok(Json(state.catalog.increment_stock(id, req.amount).await?))
}
