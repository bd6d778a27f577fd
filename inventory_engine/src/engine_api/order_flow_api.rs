use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{NewOrder, Order, OrderStatusType},
    engine_api::order_objects::{ModifyOrderRequest, OrderChanged, OrderQueryFilter},
    helpers::RetryPolicy,
    order_lifecycle,
    traits::{InventoryError, OrderManagement},
};

/// `OrderFlowApi` is the primary API for placing orders and moving them through their lifecycle.
///
/// Every method that changes an order is carried out by the backend as one unit of work together with the matching
/// stock adjustment. Units of work that lose a write race are retried according to the API's [`RetryPolicy`].
pub struct OrderFlowApi<B> {
    db: B,
    retry: RetryPolicy,
}

impl<B> Debug for OrderFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi ({:?})", self.retry)
    }
}

impl<B> OrderFlowApi<B> {
    pub fn new(db: B) -> Self {
        Self { db, retry: RetryPolicy::default() }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

impl<B> OrderFlowApi<B>
where B: OrderManagement
{
    /// Places a new order, reserving its quantity from the product's stock. The order starts out `PENDING`.
    pub async fn create_order(&self, order: NewOrder) -> Result<Order, InventoryError> {
        order_lifecycle::validate_quantity(order.quantity)?;
        let (order, product) = self.retry.run("place order", || self.db.place_order(order)).await?;
        info!("📦️ Order #{} placed for {} x [{}]. {} units remain", order.id, order.quantity, product.sku, product.stock);
        Ok(order)
    }

    pub async fn order(&self, id: i64) -> Result<Order, InventoryError> {
        self.retry.run("fetch order", || self.db.fetch_order(id)).await?.ok_or(InventoryError::OrderNotFound(id))
    }

    pub async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, InventoryError> {
        trace!("📦️ Searching orders. {query}");
        self.retry.run("search orders", || self.db.search_orders(query.clone())).await
    }

    /// Changes the status and/or quantity of an order. See [`order_lifecycle::plan_modification`] for the rules.
    pub async fn update_order(&self, id: i64, request: ModifyOrderRequest) -> Result<Order, InventoryError> {
        let changed = self.retry.run("update order", || self.db.modify_order(id, request)).await?;
        if changed.is_changed() {
            info!("📦️ Order #{id} updated. {request}");
        }
        Ok(changed.new_order)
    }

    /// Deletes a `PENDING` order and returns its quantity to stock. The returned order is marked `CANCELED`.
    pub async fn delete_order(&self, id: i64) -> Result<Order, InventoryError> {
        let order = self.retry.run("delete order", || self.db.remove_order(id)).await?;
        info!("📦️ Order #{id} canceled and deleted. {} units released", order.quantity);
        Ok(order)
    }

    /// Marks an order as `PAID`. Marking an already paid order again succeeds without changing anything, so this is
    /// safe to call for every delivery of a payment notification.
    pub async fn mark_order_paid(&self, id: i64) -> Result<OrderChanged, InventoryError> {
        let request = ModifyOrderRequest::default().with_new_status(OrderStatusType::Paid);
        let changed = self.retry.run("mark order paid", || self.db.modify_order(id, request)).await?;
        if changed.is_changed() {
            info!("📦️ Order #{id} is now PAID");
        } else {
            debug!("📦️ Order #{id} was already PAID");
        }
        Ok(changed)
    }
}
