use crate::{
    db_types::{NewOrder, Order, Product},
    engine_api::order_objects::{ModifyOrderRequest, OrderChanged, OrderQueryFilter},
    traits::InventoryError,
};

/// Order operations.
///
/// Every method that changes an order also changes the stock of the product it draws from. Implementations must carry
/// out the read, the validation (via [`crate::order_lifecycle`]) and both writes as one unit of work, so that either
/// everything is committed or nothing is, and so that concurrent units of work against the same product can never
/// drive its stock below zero.
#[allow(async_fn_in_trait)]
pub trait OrderManagement {
    async fn fetch_order(&self, id: i64) -> Result<Option<Order>, InventoryError>;

    /// Orders matching the filter, ordered by creation time.
    async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, InventoryError>;

    /// Reserves `order.quantity` units of the product and stores a new `PENDING` order.
    ///
    /// Returns the new order and the product with its updated stock.
    async fn place_order(&self, order: NewOrder) -> Result<(Order, Product), InventoryError>;

    /// Applies a status and/or quantity change to an order, adjusting the product's stock by the opposite of the
    /// quantity delta.
    async fn modify_order(&self, id: i64, request: ModifyOrderRequest) -> Result<OrderChanged, InventoryError>;

    /// Removes a `PENDING` order and releases its reserved stock. The returned order carries the `CANCELED` status.
    async fn remove_order(&self, id: i64) -> Result<Order, InventoryError>;
}
