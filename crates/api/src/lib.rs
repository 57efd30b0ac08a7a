//! HTTP services for the storefront.
//!
//! One binary serves the cart, catalog and orders services, either one per
//! process (`SERVICE=cart|catalog|orders`) or all together (`SERVICE=all`).
//! Every router carries structured request logging (tracing), CORS, a
//! `/health` probe and Prometheus metrics at `/metrics`.

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post, put};
use cart::InMemoryCartStore;
use catalog::InMemoryCatalogStore;
use checkout::{
    CartService, CatalogService, HttpCartService, HttpCatalogService, LocalCartService,
    LocalCatalogService, OrderWorkflow, ServiceError, StockStrategy,
};
use identity::{AuthError, CachingIdentityVerifier, HttpIdentitySource};
use metrics_exporter_prometheus::PrometheusHandle;
use orders::InMemoryOrderStore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use auth::SharedVerifier;
use config::{Config, ServiceMode};
use state::{CartState, CatalogState, OrdersState};

/// Stores shared by every service when they run in one process.
#[derive(Debug, Clone, Default)]
pub struct InProcessStores {
    pub carts: InMemoryCartStore,
    pub catalog: InMemoryCatalogStore,
    pub orders: InMemoryOrderStore,
}

/// The services a process exposes, each with its handler state.
pub struct Services {
    pub mode: ServiceMode,
    pub cart: Option<CartState>,
    pub catalog: Option<CatalogState>,
    pub orders: Option<OrdersState>,
}

impl Services {
    /// Runs every service over `stores`, with the order workflow calling the
    /// cart and catalog stores directly.
    pub fn in_process(
        stores: &InProcessStores,
        verifier: SharedVerifier,
        strategy: StockStrategy,
    ) -> Self {
        let cart_service: Arc<dyn CartService> =
            Arc::new(LocalCartService::new(stores.carts.clone()));
        let catalog_service: Arc<dyn CatalogService> =
            Arc::new(LocalCatalogService::new(stores.catalog.clone()));
        let workflow = OrderWorkflow::new(stores.orders.clone(), cart_service, catalog_service)
            .with_strategy(strategy);

        Self {
            mode: ServiceMode::All,
            cart: Some(CartState {
                carts: Arc::new(stores.carts.clone()),
                verifier: verifier.clone(),
            }),
            catalog: Some(CatalogState {
                catalog: Arc::new(stores.catalog.clone()),
                verifier: verifier.clone(),
            }),
            orders: Some(OrdersState {
                workflow: Arc::new(workflow),
                verifier,
            }),
        }
    }

    /// Builds the services selected by `config.service`.
    ///
    /// A standalone orders service reaches the cart and catalog over HTTP.
    pub fn from_config(config: &Config, verifier: SharedVerifier) -> Result<Self, ServiceError> {
        let mut services = Self {
            mode: config.service,
            cart: None,
            catalog: None,
            orders: None,
        };

        match config.service {
            ServiceMode::All => {
                return Ok(Self::in_process(
                    &InProcessStores::default(),
                    verifier,
                    config.stock_strategy,
                ));
            }
            ServiceMode::Cart => {
                services.cart = Some(CartState {
                    carts: Arc::new(InMemoryCartStore::new()),
                    verifier,
                });
            }
            ServiceMode::Catalog => {
                services.catalog = Some(CatalogState {
                    catalog: Arc::new(InMemoryCatalogStore::new()),
                    verifier,
                });
            }
            ServiceMode::Orders => {
                let cart: Arc<dyn CartService> = Arc::new(HttpCartService::new(
                    config.cart_service_url.clone(),
                    config.upstream_timeout,
                )?);
                let catalog: Arc<dyn CatalogService> = Arc::new(HttpCatalogService::new(
                    config.products_service_url.clone(),
                    config.upstream_timeout,
                )?);
                let workflow = OrderWorkflow::new(InMemoryOrderStore::new(), cart, catalog)
                    .with_strategy(config.stock_strategy);
                services.orders = Some(OrdersState {
                    workflow: Arc::new(workflow),
                    verifier,
                });
            }
        }

        Ok(services)
    }
}

/// Creates the verifier that checks credentials against the accounts service.
///
/// Also starts the background task that reclaims expired cache entries, so
/// this must run inside the Tokio runtime.
pub fn create_verifier(config: &Config) -> Result<SharedVerifier, AuthError> {
    let source = HttpIdentitySource::new(config.auth_service_url.clone(), config.auth_timeout)?;
    let verifier = CachingIdentityVerifier::with_ttl(source, config.identity_cache_ttl);
    verifier.cache().spawn_purger(config.identity_cache_ttl);
    Ok(Arc::new(verifier))
}

/// Registers descriptions for the metrics emitted across the workspace.
pub fn describe_metrics() {
    metrics::describe_counter!("orders_created_total", "Orders created by checkout");
    metrics::describe_counter!("orders_cancelled_total", "Orders moved to cancelled");
    metrics::describe_counter!(
        "order_creation_failures_total",
        "Checkouts refused, by reason"
    );
    metrics::describe_counter!(
        "workflow_warnings_total",
        "Best-effort steps that failed after an order was committed"
    );
    metrics::describe_histogram!(
        "order_creation_duration_seconds",
        metrics::Unit::Seconds,
        "Time spent creating an order"
    );
    metrics::describe_counter!("identity_cache_hits_total", "Credential cache hits");
    metrics::describe_counter!("identity_cache_misses_total", "Credential cache misses");
    metrics::describe_counter!(
        "identity_verification_failures_total",
        "Credentials the accounts service rejected or could not check"
    );
    metrics::describe_counter!("catalog_stock_writes_total", "Stock writes, by kind");
    metrics::describe_counter!("cart_items_added_total", "Cart add operations");
}

/// Cart service routes.
pub fn cart_router(state: CartState) -> Router {
    Router::new()
        .route("/api/cart", get(routes::cart::get))
        .route("/api/cart/add", post(routes::cart::add))
        .route("/api/cart/items/{id}", put(routes::cart::update_item))
        .route(
            "/api/cart/items/{id}/remove",
            axum::routing::delete(routes::cart::remove_item),
        )
        .route("/api/cart/clear", axum::routing::delete(routes::cart::clear))
        .with_state(state)
}

/// Catalog service routes.
pub fn catalog_router(state: CatalogState) -> Router {
    use routes::catalog;

    Router::new()
        .route(
            "/api/products/category",
            get(catalog::list_categories).post(catalog::create_category),
        )
        .route(
            "/api/products/category/{id}",
            get(catalog::get_category)
                .put(catalog::update_category)
                .delete(catalog::delete_category),
        )
        .route(
            "/api/products/product",
            get(catalog::list_products).post(catalog::create_product),
        )
        .route(
            "/api/products/product/{id}",
            get(catalog::get_product)
                .put(catalog::update_product)
                .delete(catalog::delete_product),
        )
        .route("/api/products/product/{id}/stock", put(catalog::set_stock))
        .route(
            "/api/products/product/{id}/stock/decrement",
            post(catalog::decrement_stock),
        )
        .route(
            "/api/products/product/{id}/stock/increment",
            post(catalog::increment_stock),
        )
        .with_state(state)
}

/// Orders service routes.
pub fn orders_router(state: OrdersState) -> Router {
    use routes::orders;

    Router::new()
        .route("/api/orders", get(orders::list))
        .route("/api/orders/create", post(orders::create))
        .route("/api/orders/all", get(orders::list_all))
        .route("/api/orders/{id}", get(orders::get))
        .route("/api/orders/{id}/cancel", put(orders::cancel))
        .route("/api/orders/{id}/status", put(orders::update_status))
        .with_state(state)
}

/// Creates the Axum application router for the selected services.
pub fn create_app(services: Services, metrics_handle: PrometheusHandle) -> Router {
    let mut app = Router::new();
    if let Some(state) = services.cart {
        app = app.merge(cart_router(state));
    }
    if let Some(state) = services.catalog {
        app = app.merge(catalog_router(state));
    }
    if let Some(state) = services.orders {
        app = app.merge(orders_router(state));
    }

    let health_router = Router::new()
        .route("/health", get(routes::health::check))
        .with_state(services.mode);
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    app.merge(health_router)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}
