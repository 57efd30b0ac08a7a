//! Health check endpoint.

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::config::ServiceMode;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// GET /health: reports which service this process runs.
pub async fn check(State(service): State<ServiceMode>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: service.as_str(),
        version: env!("CARGO_PKG_VERSION"),
    })
}
