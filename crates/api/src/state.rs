//! Shared state for each service's handlers.

use std::sync::Arc;

use axum::extract::FromRef;
use cart::CartStore;
use catalog::CatalogStore;
use checkout::{CartService, CatalogService, OrderWorkflow};
use orders::InMemoryOrderStore;

use crate::auth::SharedVerifier;

/// The order workflow as wired by the server.
///
/// Collaborators are trait objects so the same handlers serve both the
/// standalone orders service (HTTP collaborators) and the all-in-one process
/// (in-process collaborators).
pub type Workflow =
    OrderWorkflow<InMemoryOrderStore, Arc<dyn CartService>, Arc<dyn CatalogService>>;

#[derive(Clone)]
pub struct CartState {
    pub carts: Arc<dyn CartStore>,
    pub verifier: SharedVerifier,
}

#[derive(Clone)]
pub struct CatalogState {
    pub catalog: Arc<dyn CatalogStore>,
    pub verifier: SharedVerifier,
}

#[derive(Clone)]
pub struct OrdersState {
    pub workflow: Arc<Workflow>,
    pub verifier: SharedVerifier,
}

impl FromRef<CartState> for SharedVerifier {
    fn from_ref(state: &CartState) -> Self {
        state.verifier.clone()
    }
}

impl FromRef<CatalogState> for SharedVerifier {
    fn from_ref(state: &CatalogState) -> Self {
        state.verifier.clone()
    }
}

impl FromRef<OrdersState> for SharedVerifier {
    fn from_ref(state: &OrdersState) -> Self {
        state.verifier.clone()
    }
}
