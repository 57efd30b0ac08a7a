//! Integration tests for the order workflow, driven through fake collaborators.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use checkout::{
    Caller, CartItemSnapshot, CartService, CartSnapshot, CatalogService, OrderWorkflow,
    ProductSnapshot, ServiceError, StockStrategy, WorkflowError, WorkflowWarning,
};
use common::{Credential, Identity, Money, OrderId, ProductId, UserId};
use orders::{CheckoutDetails, InMemoryOrderStore, OrderStatus, OrderStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StockCall {
    Set(ProductId, i64),
    Decrement(ProductId, u32),
    Increment(ProductId, u32),
}

#[derive(Debug, Clone, Copy)]
enum FetchFailure {
    Unreachable,
    Timeout,
}

#[derive(Default)]
struct CartState {
    items: Vec<CartItemSnapshot>,
    fail_fetch: Option<FetchFailure>,
    fail_clear: bool,
    clears: usize,
}

#[derive(Clone, Default)]
struct FakeCart {
    state: Arc<Mutex<CartState>>,
}

impl FakeCart {
    fn put(&self, product: i64, quantity: u32, cents: i64) {
        self.state.lock().unwrap().items.push(CartItemSnapshot {
            product_id: ProductId::new(product),
            quantity,
            price: Money::from_cents(cents),
        });
    }

    fn len(&self) -> usize {
        self.state.lock().unwrap().items.len()
    }

    fn clears(&self) -> usize {
        self.state.lock().unwrap().clears
    }
}

#[async_trait]
impl CartService for FakeCart {
    async fn fetch_cart(&self, _caller: &Caller) -> Result<CartSnapshot, ServiceError> {
        let state = self.state.lock().unwrap();
        match state.fail_fetch {
            Some(FetchFailure::Unreachable) => {
                return Err(ServiceError::Upstream("connection refused".to_string()));
            }
            Some(FetchFailure::Timeout) => return Err(ServiceError::Timeout),
            None => {}
        }
        Ok(CartSnapshot {
            items: state.items.clone(),
        })
    }

    async fn clear_cart(&self, _caller: &Caller) -> Result<(), ServiceError> {
        let mut state = self.state.lock().unwrap();
        state.clears += 1;
        if state.fail_clear {
            return Err(ServiceError::Upstream("cart service unavailable".to_string()));
        }
        state.items.clear();
        Ok(())
    }
}

#[derive(Default)]
struct CatalogState {
    products: HashMap<ProductId, ProductSnapshot>,
    fail_writes: bool,
    fail_reads_after: Option<usize>,
    stale_stock: HashMap<ProductId, i64>,
    reads: usize,
    calls: Vec<StockCall>,
}

#[derive(Clone, Default)]
struct FakeCatalog {
    state: Arc<Mutex<CatalogState>>,
}

impl FakeCatalog {
    fn add(&self, id: i64, name: &str, cents: i64, stock: i64) {
        let id = ProductId::new(id);
        self.state.lock().unwrap().products.insert(
            id,
            ProductSnapshot {
                id,
                name: name.to_string(),
                price: Money::from_cents(cents),
                stock,
            },
        );
    }

    fn stock(&self, id: i64) -> i64 {
        self.state.lock().unwrap().products[&ProductId::new(id)].stock
    }

    fn set_stock_directly(&self, id: i64, stock: i64) {
        if let Some(p) = self
            .state
            .lock()
            .unwrap()
            .products
            .get_mut(&ProductId::new(id))
        {
            p.stock = stock;
        }
    }

    fn calls(&self) -> Vec<StockCall> {
        self.state.lock().unwrap().calls.clone()
    }

    fn fail_writes(&self, fail: bool) {
        self.state.lock().unwrap().fail_writes = fail;
    }

    fn write(
        &self,
        call: StockCall,
        id: ProductId,
        apply: impl FnOnce(i64) -> Result<i64, ServiceError>,
    ) -> Result<ProductSnapshot, ServiceError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        if state.fail_writes {
            return Err(ServiceError::Timeout);
        }
        let product = state
            .products
            .get_mut(&id)
            .ok_or_else(|| ServiceError::NotFound(format!("product {id}")))?;
        product.stock = apply(product.stock)?;
        Ok(product.clone())
    }
}

#[async_trait]
impl CatalogService for FakeCatalog {
    async fn get_product(&self, id: ProductId) -> Result<ProductSnapshot, ServiceError> {
        let mut state = self.state.lock().unwrap();
        state.reads += 1;
        if state.fail_reads_after.is_some_and(|n| state.reads > n) {
            return Err(ServiceError::Upstream("catalog unavailable".to_string()));
        }
        let mut product = state
            .products
            .get(&id)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(format!("product {id}")))?;
        if let Some(stale) = state.stale_stock.get(&id) {
            product.stock = *stale;
        }
        Ok(product)
    }

    async fn set_stock(
        &self,
        _caller: &Caller,
        id: ProductId,
        stock: i64,
    ) -> Result<ProductSnapshot, ServiceError> {
        self.write(StockCall::Set(id, stock), id, |_| Ok(stock))
    }

    async fn decrement_stock_if_available(
        &self,
        _caller: &Caller,
        id: ProductId,
        amount: u32,
    ) -> Result<ProductSnapshot, ServiceError> {
        self.write(StockCall::Decrement(id, amount), id, |current| {
            let amount = i64::from(amount);
            if current < amount {
                Err(ServiceError::InsufficientStock(id))
            } else {
                Ok(current - amount)
            }
        })
    }

    async fn increment_stock(
        &self,
        _caller: &Caller,
        id: ProductId,
        amount: u32,
    ) -> Result<ProductSnapshot, ServiceError> {
        self.write(StockCall::Increment(id, amount), id, |current| {
            Ok(current + i64::from(amount))
        })
    }
}

type TestWorkflow = OrderWorkflow<InMemoryOrderStore, FakeCart, FakeCatalog>;

struct TestHarness {
    workflow: TestWorkflow,
    orders: InMemoryOrderStore,
    cart: FakeCart,
    catalog: FakeCatalog,
}

impl TestHarness {
    fn new() -> Self {
        Self::with_strategy(StockStrategy::Overwrite)
    }

    fn with_strategy(strategy: StockStrategy) -> Self {
        let orders = InMemoryOrderStore::new();
        let cart = FakeCart::default();
        let catalog = FakeCatalog::default();
        let workflow = OrderWorkflow::new(orders.clone(), cart.clone(), catalog.clone())
            .with_strategy(strategy);
        catalog.add(1, "Widget", 1000, 10);
        catalog.add(2, "Gadget", 500, 5);
        Self {
            workflow,
            orders,
            cart,
            catalog,
        }
    }

    async fn checkout(&self, who: &Caller) -> checkout::CreateOrderOutcome {
        self.cart.put(1, 2, 1000);
        self.cart.put(2, 1, 500);
        self.workflow
            .create_order(who, CheckoutDetails::default())
            .await
            .unwrap()
    }
}

fn customer(id: i64) -> Caller {
    Caller::new(
        Identity {
            id: UserId::new(id),
            username: format!("customer{id}"),
            email: format!("customer{id}@example.com"),
            is_staff: false,
            is_superuser: false,
        },
        Credential::new(format!("token-{id}")),
    )
}

fn staff() -> Caller {
    let mut caller = customer(100);
    caller.identity.is_staff = true;
    caller
}

#[tokio::test]
async fn test_create_order_prices_from_cart_snapshot() {
    let h = TestHarness::new();
    let alice = customer(1);

    let outcome = h.checkout(&alice).await;
    let order = &outcome.order;

    assert!(outcome.warnings.is_empty());
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.user_id, alice.identity.id);
    assert_eq!(order.subtotal().to_string(), "25.00");
    assert_eq!(order.tax_amount.to_string(), "2.50");
    assert_eq!(order.total_amount.to_string(), "27.50");
    assert!(order.order_number.as_str().starts_with("ORD-"));

    assert_eq!(order.items.len(), 2);
    assert_eq!(order.items[0].product_name, "Widget");
    assert_eq!(order.items[0].quantity, 2);
    assert_eq!(order.items[0].price.to_string(), "10.00");
    assert_eq!(order.items[0].subtotal.to_string(), "20.00");
    assert_eq!(order.items[1].product_name, "Gadget");
    assert_eq!(order.items[1].subtotal.to_string(), "5.00");
}

#[tokio::test]
async fn test_create_order_ignores_current_catalog_price() {
    let h = TestHarness::new();
    h.catalog.add(1, "Widget v2", 9999, 10);
    h.cart.put(1, 1, 1000);

    let outcome = h
        .workflow
        .create_order(&customer(1), CheckoutDetails::default())
        .await
        .unwrap();

    assert_eq!(outcome.order.items[0].price.cents(), 1000);
    assert_eq!(outcome.order.items[0].product_name, "Widget v2");
    assert_eq!(outcome.order.total_amount.cents(), 1100);
}

#[tokio::test]
async fn test_create_order_takes_stock_and_clears_cart() {
    let h = TestHarness::new();
    h.checkout(&customer(1)).await;

    assert_eq!(
        h.catalog.calls(),
        vec![
            StockCall::Set(ProductId::new(1), 8),
            StockCall::Set(ProductId::new(2), 4),
        ]
    );
    assert_eq!(h.catalog.stock(1), 8);
    assert_eq!(h.catalog.stock(2), 4);
    assert_eq!(h.cart.len(), 0);
    assert_eq!(h.cart.clears(), 1);
}

#[tokio::test]
async fn test_create_order_keeps_delivery_details() {
    let h = TestHarness::new();
    h.cart.put(1, 1, 1000);
    let details: CheckoutDetails = serde_json::from_value(serde_json::json!({
        "delivery_name": "Dana",
        "delivery_city": "Pune",
        "payment_method": "CARD"
    }))
    .unwrap();

    let outcome = h
        .workflow
        .create_order(&customer(1), details)
        .await
        .unwrap();

    assert_eq!(outcome.order.details.delivery.name, "Dana");
    assert_eq!(outcome.order.details.delivery.country, "India");
    assert_eq!(outcome.order.details.payment_method, "CARD");
}

#[tokio::test]
async fn test_empty_cart_creates_nothing() {
    let h = TestHarness::new();

    let result = h
        .workflow
        .create_order(&customer(1), CheckoutDetails::default())
        .await;

    assert!(matches!(result, Err(WorkflowError::EmptyCart)));
    assert_eq!(h.orders.order_count().await, 0);
    assert!(h.catalog.calls().is_empty());
}

#[tokio::test]
async fn test_insufficient_stock_creates_nothing() {
    let h = TestHarness::new();
    h.cart.put(1, 2, 1000);
    h.cart.put(2, 6, 500);

    let result = h
        .workflow
        .create_order(&customer(1), CheckoutDetails::default())
        .await;

    match result {
        Err(WorkflowError::InsufficientStock {
            product_id,
            available,
            requested,
            ..
        }) => {
            assert_eq!(product_id, ProductId::new(2));
            assert_eq!(available, 5);
            assert_eq!(requested, 6);
        }
        other => panic!("expected InsufficientStock, got {other:?}"),
    }
    assert_eq!(h.orders.order_count().await, 0);
    assert!(h.catalog.calls().is_empty());
    assert_eq!(h.cart.len(), 2);
    assert_eq!(h.cart.clears(), 0);
}

#[tokio::test]
async fn test_missing_product_creates_nothing() {
    let h = TestHarness::new();
    h.cart.put(1, 1, 1000);
    h.cart.put(42, 1, 100);

    let result = h
        .workflow
        .create_order(&customer(1), CheckoutDetails::default())
        .await;

    assert!(matches!(result, Err(WorkflowError::ProductNotFound(id)) if id == ProductId::new(42)));
    assert_eq!(h.orders.order_count().await, 0);
    assert!(h.catalog.calls().is_empty());
}

#[tokio::test]
async fn test_catalog_outage_during_validation_aborts() {
    let h = TestHarness::new();
    h.cart.put(1, 1, 1000);
    h.cart.put(2, 1, 500);
    h.catalog.state.lock().unwrap().fail_reads_after = Some(1);

    let result = h
        .workflow
        .create_order(&customer(1), CheckoutDetails::default())
        .await;

    assert!(matches!(result, Err(WorkflowError::Upstream(_))));
    assert_eq!(h.orders.order_count().await, 0);
}

#[tokio::test]
async fn test_cart_fetch_failure_is_upstream_error() {
    let h = TestHarness::new();
    h.cart.state.lock().unwrap().fail_fetch = Some(FetchFailure::Unreachable);
    assert!(matches!(
        h.workflow
            .create_order(&customer(1), CheckoutDetails::default())
            .await,
        Err(WorkflowError::Upstream(_))
    ));

    h.cart.state.lock().unwrap().fail_fetch = Some(FetchFailure::Timeout);
    assert!(matches!(
        h.workflow
            .create_order(&customer(1), CheckoutDetails::default())
            .await,
        Err(WorkflowError::Timeout)
    ));
    assert_eq!(h.orders.order_count().await, 0);
}

#[tokio::test]
async fn test_stock_write_failure_keeps_order() {
    let h = TestHarness::new();
    h.catalog.fail_writes(true);

    let outcome = h.checkout(&customer(1)).await;

    assert_eq!(h.orders.order_count().await, 1);
    assert_eq!(outcome.warnings.len(), 2);
    assert!(matches!(
        outcome.warnings[0],
        WorkflowWarning::StockUpdateFailed { product_id, .. } if product_id == ProductId::new(1)
    ));
    assert_eq!(h.catalog.stock(1), 10);
    assert_eq!(h.cart.len(), 0);
}

#[tokio::test]
async fn test_cart_clear_failure_keeps_order() {
    let h = TestHarness::new();
    h.cart.state.lock().unwrap().fail_clear = true;

    let outcome = h.checkout(&customer(1)).await;

    assert_eq!(outcome.order.status, OrderStatus::Pending);
    assert!(matches!(
        outcome.warnings.as_slice(),
        [WorkflowWarning::CartClearFailed { .. }]
    ));
    assert_eq!(h.catalog.stock(1), 8);
}

#[tokio::test]
async fn test_order_numbers_are_unique() {
    let h = TestHarness::new();
    h.catalog.add(1, "Widget", 1000, 1_000);
    h.catalog.add(2, "Gadget", 500, 1_000);

    let mut numbers = HashSet::new();
    for _ in 0..50 {
        let outcome = h.checkout(&customer(1)).await;
        numbers.insert(outcome.order.order_number.clone());
    }
    assert_eq!(numbers.len(), 50);
}

#[tokio::test]
async fn test_cancel_pending_order_restocks_each_line() {
    let h = TestHarness::new();
    let alice = customer(1);
    let order = h.checkout(&alice).await.order;
    h.catalog.set_stock_directly(1, 3);

    let outcome = h.workflow.cancel_order(&alice, order.id).await.unwrap();

    assert_eq!(outcome.order.status, OrderStatus::Cancelled);
    assert!(outcome.warnings.is_empty());
    let calls = h.catalog.calls();
    assert_eq!(
        &calls[2..],
        &[
            StockCall::Set(ProductId::new(1), 5),
            StockCall::Set(ProductId::new(2), 5),
        ]
    );
}

#[tokio::test]
async fn test_cancel_confirmed_order() {
    let h = TestHarness::new();
    let alice = customer(1);
    let order = h.checkout(&alice).await.order;
    h.workflow
        .set_status(&staff(), order.id, "confirmed")
        .await
        .unwrap();

    let outcome = h.workflow.cancel_order(&alice, order.id).await.unwrap();
    assert_eq!(outcome.order.status, OrderStatus::Cancelled);
}

#[tokio::test]
async fn test_cancel_shipped_order_is_refused() {
    let h = TestHarness::new();
    let alice = customer(1);
    let order = h.checkout(&alice).await.order;
    h.workflow
        .set_status(&staff(), order.id, "shipped")
        .await
        .unwrap();
    let writes_before = h.catalog.calls().len();

    let result = h.workflow.cancel_order(&alice, order.id).await;

    assert!(matches!(
        result,
        Err(WorkflowError::InvalidTransition {
            from: OrderStatus::Shipped,
            to: OrderStatus::Cancelled
        })
    ));
    assert_eq!(
        h.orders.get(order.id).await.unwrap().status,
        OrderStatus::Shipped
    );
    assert_eq!(h.catalog.calls().len(), writes_before);
}

#[tokio::test]
async fn test_cancel_someone_elses_order_is_not_found() {
    let h = TestHarness::new();
    let order = h.checkout(&customer(1)).await.order;

    let result = h.workflow.cancel_order(&customer(2), order.id).await;
    assert!(matches!(result, Err(WorkflowError::OrderNotFound(_))));
    assert!(matches!(
        h.workflow.get_order(&customer(2), order.id).await,
        Err(WorkflowError::OrderNotFound(_))
    ));
}

#[tokio::test]
async fn test_cancel_tolerates_restock_failure() {
    let h = TestHarness::new();
    let alice = customer(1);
    let order = h.checkout(&alice).await.order;
    h.catalog.fail_writes(true);

    let outcome = h.workflow.cancel_order(&alice, order.id).await.unwrap();

    assert_eq!(outcome.order.status, OrderStatus::Cancelled);
    assert_eq!(outcome.warnings.len(), 2);
    assert!(matches!(
        outcome.warnings[0],
        WorkflowWarning::RestockFailed { .. }
    ));
}

#[tokio::test]
async fn test_cancel_reports_restock_overflow_as_warning() {
    let h = TestHarness::new();
    let alice = customer(1);
    let order = h.checkout(&alice).await.order;
    h.catalog.set_stock_directly(1, i64::MAX);

    let outcome = h.workflow.cancel_order(&alice, order.id).await.unwrap();

    assert_eq!(outcome.order.status, OrderStatus::Cancelled);
    assert_eq!(outcome.warnings.len(), 1);
    assert!(matches!(
        outcome.warnings[0],
        WorkflowWarning::RestockFailed { product_id, .. } if product_id == ProductId::new(1)
    ));
    assert_eq!(h.catalog.stock(1), i64::MAX);
    assert_eq!(h.catalog.stock(2), 5);
}

#[tokio::test]
async fn test_order_total_beyond_limit_creates_nothing() {
    let h = TestHarness::new();
    h.catalog.set_stock_directly(1, 1_000);
    h.cart.put(1, 1_000, Money::MAX.cents());

    let result = h
        .workflow
        .create_order(&customer(1), CheckoutDetails::default())
        .await;

    assert!(matches!(result, Err(WorkflowError::AmountTooLarge)));
    assert_eq!(h.orders.order_count().await, 0);
    assert!(h.catalog.calls().is_empty());
}

#[tokio::test]
async fn test_set_status_requires_staff() {
    let h = TestHarness::new();
    let alice = customer(1);
    let order = h.checkout(&alice).await.order;

    let result = h.workflow.set_status(&alice, order.id, "shipped").await;

    assert!(matches!(result, Err(WorkflowError::Forbidden(_))));
    assert_eq!(
        h.orders.get(order.id).await.unwrap().status,
        OrderStatus::Pending
    );
}

#[tokio::test]
async fn test_set_status_rejects_unknown_status() {
    let h = TestHarness::new();
    let order = h.checkout(&customer(1)).await.order;

    let result = h.workflow.set_status(&staff(), order.id, "lost").await;
    assert!(matches!(result, Err(WorkflowError::InvalidStatus(s)) if s == "lost"));
}

#[tokio::test]
async fn test_set_status_missing_order() {
    let h = TestHarness::new();
    let result = h
        .workflow
        .set_status(&staff(), OrderId::new(404), "shipped")
        .await;
    assert!(matches!(result, Err(WorkflowError::OrderNotFound(_))));
}

#[tokio::test]
async fn test_staff_cancel_from_processing_restocks() {
    let h = TestHarness::new();
    let order = h.checkout(&customer(1)).await.order;
    h.workflow
        .set_status(&staff(), order.id, "processing")
        .await
        .unwrap();

    let outcome = h
        .workflow
        .set_status(&staff(), order.id, "cancelled")
        .await
        .unwrap();

    assert_eq!(outcome.order.status, OrderStatus::Cancelled);
    assert_eq!(h.catalog.stock(1), 10);
    assert_eq!(h.catalog.stock(2), 5);
}

#[tokio::test]
async fn test_set_status_out_of_terminal_state_is_refused() {
    let h = TestHarness::new();
    let order = h.checkout(&customer(1)).await.order;
    h.workflow
        .set_status(&staff(), order.id, "delivered")
        .await
        .unwrap();

    for target in ["pending", "shipped", "cancelled"] {
        let result = h.workflow.set_status(&staff(), order.id, target).await;
        assert!(
            matches!(result, Err(WorkflowError::InvalidTransition { .. })),
            "{target} should be refused"
        );
    }
    assert_eq!(h.catalog.stock(1), 8);
}

#[tokio::test]
async fn test_setting_cancelled_twice_does_not_restock_twice() {
    let h = TestHarness::new();
    let alice = customer(1);
    let order = h.checkout(&alice).await.order;
    h.workflow.cancel_order(&alice, order.id).await.unwrap();
    let writes = h.catalog.calls().len();

    let outcome = h
        .workflow
        .set_status(&staff(), order.id, "cancelled")
        .await
        .unwrap();

    assert_eq!(outcome.order.status, OrderStatus::Cancelled);
    assert_eq!(h.catalog.calls().len(), writes);
}

#[tokio::test]
async fn test_conditional_strategy_uses_atomic_writes() {
    let h = TestHarness::with_strategy(StockStrategy::Conditional);
    let alice = customer(1);
    let order = h.checkout(&alice).await.order;

    h.workflow.cancel_order(&alice, order.id).await.unwrap();

    assert_eq!(
        h.catalog.calls(),
        vec![
            StockCall::Decrement(ProductId::new(1), 2),
            StockCall::Decrement(ProductId::new(2), 1),
            StockCall::Increment(ProductId::new(1), 2),
            StockCall::Increment(ProductId::new(2), 1),
        ]
    );
    assert_eq!(h.catalog.stock(1), 10);
}

/// Another checkout takes the stock between our read and our write: the
/// product really has 1 left while this checkout still sees 10.
fn lose_race(h: &TestHarness) {
    h.catalog.set_stock_directly(1, 1);
    h.catalog
        .state
        .lock()
        .unwrap()
        .stale_stock
        .insert(ProductId::new(1), 10);
    h.cart.put(1, 2, 1000);
}

#[tokio::test]
async fn test_conditional_strategy_reports_lost_race_as_warning() {
    let h = TestHarness::with_strategy(StockStrategy::Conditional);
    lose_race(&h);

    let outcome = h
        .workflow
        .create_order(&customer(1), CheckoutDetails::default())
        .await
        .unwrap();

    assert_eq!(h.orders.order_count().await, 1);
    assert!(matches!(
        outcome.warnings.as_slice(),
        [WorkflowWarning::StockUpdateFailed { product_id, .. }] if *product_id == ProductId::new(1)
    ));
    assert_eq!(h.catalog.stock(1), 1);
}

#[tokio::test]
async fn test_overwrite_strategy_oversells_on_lost_race() {
    let h = TestHarness::new();
    lose_race(&h);

    let outcome = h
        .workflow
        .create_order(&customer(1), CheckoutDetails::default())
        .await
        .unwrap();

    assert!(outcome.warnings.is_empty());
    assert_eq!(h.catalog.stock(1), 8);
}

#[tokio::test]
async fn test_listing() {
    let h = TestHarness::new();
    let alice = customer(1);
    let first = h.checkout(&alice).await.order;
    let second = h.checkout(&alice).await.order;
    h.checkout(&customer(2)).await;

    let mine = h.workflow.list_orders(&alice).await.unwrap();
    assert_eq!(
        mine.iter().map(|o| o.id).collect::<Vec<_>>(),
        vec![second.id, first.id]
    );
    assert_eq!(h.workflow.list_all_orders(&staff()).await.unwrap().len(), 3);
    assert!(matches!(
        h.workflow.list_all_orders(&alice).await,
        Err(WorkflowError::Forbidden(_))
    ));
}
