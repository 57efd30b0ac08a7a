//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use cart::CartError;
use catalog::CatalogError;
use checkout::WorkflowError;
use identity::AuthError;

/// API-level error type that maps to HTTP responses.
///
/// Every error renders as `{"error": message}`.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// The caller could not be authenticated.
    Unauthorized(String),
    /// The caller lacks the required role.
    Forbidden(String),
    /// Catalog error.
    Catalog(CatalogError),
    /// Cart error.
    Cart(CartError),
    /// Order workflow error.
    Workflow(WorkflowError),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::Catalog(err) => catalog_error_to_response(err),
            ApiError::Cart(err) => cart_error_to_response(err),
            ApiError::Workflow(err) => workflow_error_to_response(err),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        if status.is_server_error() {
            tracing::error!(%status, error = %message, "request failed");
        }

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn catalog_error_to_response(err: CatalogError) -> (StatusCode, String) {
    match &err {
        CatalogError::ProductNotFound(_) | CatalogError::CategoryNotFound(_) => {
            (StatusCode::NOT_FOUND, err.to_string())
        }
        CatalogError::Validation(_) => (StatusCode::BAD_REQUEST, err.to_string()),
        CatalogError::InsufficientStock { .. } => (StatusCode::CONFLICT, err.to_string()),
    }
}

fn cart_error_to_response(err: CartError) -> (StatusCode, String) {
    match &err {
        CartError::ItemNotFound(_) => (StatusCode::NOT_FOUND, "Cart item not found".to_string()),
        CartError::Validation(_) => (StatusCode::BAD_REQUEST, err.to_string()),
    }
}

fn workflow_error_to_response(err: WorkflowError) -> (StatusCode, String) {
    let status = match &err {
        WorkflowError::EmptyCart
        | WorkflowError::ProductNotFound(_)
        | WorkflowError::InsufficientStock { .. }
        | WorkflowError::AmountTooLarge
        | WorkflowError::InvalidTransition { .. }
        | WorkflowError::InvalidStatus(_) => StatusCode::BAD_REQUEST,
        WorkflowError::OrderNotFound(_) => StatusCode::NOT_FOUND,
        WorkflowError::Forbidden(_) => StatusCode::FORBIDDEN,
        WorkflowError::Conflict(_) => StatusCode::CONFLICT,
        WorkflowError::Upstream(_) => StatusCode::BAD_GATEWAY,
        WorkflowError::Timeout => StatusCode::GATEWAY_TIMEOUT,
        WorkflowError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, err.to_string())
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        ApiError::Catalog(err)
    }
}

impl From<CartError> for ApiError {
    fn from(err: CartError) -> Self {
        ApiError::Cart(err)
    }
}

impl From<WorkflowError> for ApiError {
    fn from(err: WorkflowError) -> Self {
        ApiError::Workflow(err)
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Unauthorized(err.to_string())
    }
}
