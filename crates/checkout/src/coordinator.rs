//! Order workflow coordinator.

use common::{OrderId, ProductId};
use orders::{
    CheckoutDetails, NewOrder, NewOrderLine, Order, OrderNumber, OrderStatus, OrderStore,
};
use serde::Serialize;

use crate::caller::Caller;
use crate::error::{Result, ServiceError, WorkflowError};
use crate::pricing::OrderTotals;
use crate::services::{CartItemSnapshot, CartService, CatalogService, ProductSnapshot};
use crate::stock::StockStrategy;

/// A side effect that failed after an order was committed.
///
/// Warnings never undo the operation that produced them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WorkflowWarning {
    /// Stock could not be taken for a purchased product.
    StockUpdateFailed { product_id: ProductId, reason: String },
    /// Stock could not be returned for a cancelled line item.
    RestockFailed { product_id: ProductId, reason: String },
    /// The cart could not be emptied after checkout.
    CartClearFailed { reason: String },
}

impl std::fmt::Display for WorkflowWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkflowWarning::StockUpdateFailed { product_id, reason } => {
                write!(f, "failed to update stock for product {product_id}: {reason}")
            }
            WorkflowWarning::RestockFailed { product_id, reason } => {
                write!(f, "failed to restock product {product_id}: {reason}")
            }
            WorkflowWarning::CartClearFailed { reason } => {
                write!(f, "failed to clear cart: {reason}")
            }
        }
    }
}

/// Result of a successful checkout.
#[derive(Debug, Clone, Serialize)]
pub struct CreateOrderOutcome {
    #[serde(flatten)]
    pub order: Order,
    pub warnings: Vec<WorkflowWarning>,
}

/// Result of a successful cancellation or status change.
#[derive(Debug, Clone, Serialize)]
pub struct StatusChangeOutcome {
    #[serde(flatten)]
    pub order: Order,
    pub warnings: Vec<WorkflowWarning>,
}

/// Turns carts into orders and drives their status afterwards.
///
/// Checkout validates everything before writing anything: the cart must be
/// non-empty and every product must exist with enough stock. Once the order
/// is stored, taking stock and clearing the cart are best effort and their
/// failures are reported as [`WorkflowWarning`]s.
pub struct OrderWorkflow<O, C, P>
where
    O: OrderStore,
    C: CartService,
    P: CatalogService,
{
    orders: O,
    cart: C,
    catalog: P,
    strategy: StockStrategy,
}

impl<O, C, P> OrderWorkflow<O, C, P>
where
    O: OrderStore,
    C: CartService,
    P: CatalogService,
{
    /// Creates a workflow using the [`StockStrategy::Overwrite`] strategy.
    pub fn new(orders: O, cart: C, catalog: P) -> Self {
        Self {
            orders,
            cart,
            catalog,
            strategy: StockStrategy::default(),
        }
    }

    pub fn with_strategy(mut self, strategy: StockStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn strategy(&self) -> StockStrategy {
        self.strategy
    }

    /// Creates an order from the caller's cart.
    #[tracing::instrument(skip(self, caller, details), fields(user_id = %caller.identity.id, strategy = %self.strategy))]
    pub async fn create_order(
        &self,
        caller: &Caller,
        details: CheckoutDetails,
    ) -> Result<CreateOrderOutcome> {
        let started = std::time::Instant::now();
        let result = self.checkout(caller, details).await;
        match &result {
            Ok(outcome) => {
                metrics::counter!("orders_created_total").increment(1);
                metrics::histogram!("order_creation_duration_seconds")
                    .record(started.elapsed().as_secs_f64());
                tracing::info!(
                    order_id = %outcome.order.id,
                    order_number = %outcome.order.order_number,
                    total = %outcome.order.total_amount,
                    warnings = outcome.warnings.len(),
                    "order created"
                );
            }
            Err(e) => {
                metrics::counter!("order_creation_failures_total", "reason" => e.kind())
                    .increment(1);
                tracing::info!(error = %e, "order creation refused");
            }
        }
        result
    }

    async fn checkout(
        &self,
        caller: &Caller,
        details: CheckoutDetails,
    ) -> Result<CreateOrderOutcome> {
        // 1. Load the cart
        let cart = self.cart.fetch_cart(caller).await?;
        if cart.items.is_empty() {
            return Err(WorkflowError::EmptyCart);
        }

        // 2. Validate every product before any write
        let mut checked: Vec<(CartItemSnapshot, ProductSnapshot)> =
            Vec::with_capacity(cart.items.len());
        for item in cart.items {
            let product = self
                .catalog
                .get_product(item.product_id)
                .await
                .map_err(|e| match e {
                    ServiceError::Timeout => WorkflowError::Timeout,
                    ServiceError::Upstream(msg) => WorkflowError::Upstream(msg),
                    _ => WorkflowError::ProductNotFound(item.product_id),
                })?;
            if product.stock < i64::from(item.quantity) {
                return Err(WorkflowError::InsufficientStock {
                    product_id: product.id,
                    product_name: product.name,
                    available: product.stock,
                    requested: item.quantity,
                });
            }
            checked.push((item, product));
        }

        // 3. Price from the cart snapshot, not the current catalog price
        let lines: Vec<NewOrderLine> = checked
            .iter()
            .map(|(item, product)| NewOrderLine {
                product_id: item.product_id,
                product_name: product.name.clone(),
                quantity: item.quantity,
                price: item.price,
            })
            .collect();
        let totals = OrderTotals::from_lines(&lines).ok_or(WorkflowError::AmountTooLarge)?;

        // 4. Commit the order
        let order = self
            .orders
            .insert(NewOrder {
                order_number: OrderNumber::generate(),
                user_id: caller.identity.id,
                total_amount: totals.total,
                tax_amount: totals.tax,
                details,
                items: lines,
            })
            .await?;

        // 5. Take stock
        let mut warnings = Vec::new();
        for (item, product) in &checked {
            if let Err(reason) = self.take_stock(caller, item, product).await {
                warnings.push(WorkflowWarning::StockUpdateFailed {
                    product_id: item.product_id,
                    reason,
                });
            }
        }

        // 6. Empty the cart
        if let Err(e) = self.cart.clear_cart(caller).await {
            warnings.push(WorkflowWarning::CartClearFailed {
                reason: e.to_string(),
            });
        }

        report_warnings(&order, &warnings);
        Ok(CreateOrderOutcome { order, warnings })
    }

    async fn take_stock(
        &self,
        caller: &Caller,
        item: &CartItemSnapshot,
        product: &ProductSnapshot,
    ) -> std::result::Result<(), String> {
        let result = match self.strategy {
            StockStrategy::Overwrite => {
                let stock = product.stock - i64::from(item.quantity);
                self.catalog.set_stock(caller, item.product_id, stock).await
            }
            StockStrategy::Conditional => {
                self.catalog
                    .decrement_stock_if_available(caller, item.product_id, item.quantity)
                    .await
            }
        };
        result.map(|_| ()).map_err(|e| e.to_string())
    }

    async fn restock(&self, caller: &Caller, order: &Order) -> Vec<WorkflowWarning> {
        let mut warnings = Vec::new();
        for item in &order.items {
            let result = match self.strategy {
                StockStrategy::Overwrite => match self.catalog.get_product(item.product_id).await {
                    Ok(product) => match product.stock.checked_add(i64::from(item.quantity)) {
                        Some(stock) => self.catalog.set_stock(caller, item.product_id, stock).await,
                        None => Err(ServiceError::Upstream(format!(
                            "stock {} cannot take {} more units",
                            product.stock, item.quantity
                        ))),
                    },
                    Err(e) => Err(e),
                },
                StockStrategy::Conditional => {
                    self.catalog
                        .increment_stock(caller, item.product_id, item.quantity)
                        .await
                }
            };
            if let Err(e) = result {
                warnings.push(WorkflowWarning::RestockFailed {
                    product_id: item.product_id,
                    reason: e.to_string(),
                });
            }
        }
        warnings
    }

    /// Cancels one of the caller's own orders and returns its stock.
    #[tracing::instrument(skip(self, caller), fields(user_id = %caller.identity.id))]
    pub async fn cancel_order(
        &self,
        caller: &Caller,
        order_id: OrderId,
    ) -> Result<StatusChangeOutcome> {
        let order = self
            .orders
            .get_for_user(order_id, caller.identity.id)
            .await?;
        if !order.status.can_cancel() {
            return Err(WorkflowError::InvalidTransition {
                from: order.status,
                to: OrderStatus::Cancelled,
            });
        }

        let warnings = self.restock(caller, &order).await;
        let order = self
            .orders
            .set_status(order.id, OrderStatus::Cancelled)
            .await?;
        metrics::counter!("orders_cancelled_total", "by" => "customer").increment(1);
        report_warnings(&order, &warnings);
        Ok(StatusChangeOutcome { order, warnings })
    }

    /// Sets the status of any order. Staff only.
    ///
    /// Moving an order into `cancelled` returns its stock first.
    #[tracing::instrument(skip(self, caller), fields(user_id = %caller.identity.id))]
    pub async fn set_status(
        &self,
        caller: &Caller,
        order_id: OrderId,
        status: &str,
    ) -> Result<StatusChangeOutcome> {
        require_staff(caller)?;
        let order = self.orders.get(order_id).await?;
        let target: OrderStatus = status.parse()?;
        if !order.status.can_transition_to(target) {
            return Err(WorkflowError::InvalidTransition {
                from: order.status,
                to: target,
            });
        }

        let cancelling = target == OrderStatus::Cancelled && order.status != OrderStatus::Cancelled;
        let warnings = if cancelling {
            self.restock(caller, &order).await
        } else {
            Vec::new()
        };

        let previous = order.status;
        let order = self.orders.set_status(order.id, target).await?;
        if cancelling {
            metrics::counter!("orders_cancelled_total", "by" => "staff").increment(1);
        }
        tracing::info!(from = %previous, to = %target, "order status updated");
        report_warnings(&order, &warnings);
        Ok(StatusChangeOutcome { order, warnings })
    }

    /// Lists the caller's orders, newest first.
    pub async fn list_orders(&self, caller: &Caller) -> Result<Vec<Order>> {
        Ok(self.orders.list_for_user(caller.identity.id).await?)
    }

    /// Retrieves one of the caller's orders.
    pub async fn get_order(&self, caller: &Caller, order_id: OrderId) -> Result<Order> {
        Ok(self
            .orders
            .get_for_user(order_id, caller.identity.id)
            .await?)
    }

    /// Lists every order, newest first. Staff only.
    pub async fn list_all_orders(&self, caller: &Caller) -> Result<Vec<Order>> {
        require_staff(caller)?;
        Ok(self.orders.list_all().await?)
    }
}

fn require_staff(caller: &Caller) -> Result<()> {
    if caller.is_staff() {
        Ok(())
    } else {
        Err(WorkflowError::Forbidden("Admin access required".to_string()))
    }
}

fn report_warnings(order: &Order, warnings: &[WorkflowWarning]) {
    for warning in warnings {
        metrics::counter!("workflow_warnings_total").increment(1);
        tracing::warn!(order_id = %order.id, %warning, "best-effort step failed");
    }
}
