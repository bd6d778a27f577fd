//! # Order state machine
//!
//! Orders move `PENDING` → `PAID` → `SHIPPED`. `CANCELED` is only reachable from `PENDING`, by deleting the order.
//! No status is ever re-entered.
//!
//! The functions in this module are pure. They inspect the current order and the requested change and return either a
//! rejection or an [`OrderPlan`] describing the new order state together with the stock adjustment that has to be
//! written in the same unit of work. Backends apply the plan; they never decide transitions themselves.
use crate::{
    db_types::{Order, OrderStatusType, OrderStatusType::*},
    engine_api::order_objects::ModifyOrderRequest,
    traits::InventoryError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusOutcome {
    /// The order moves to the given status.
    Advance(OrderStatusType),
    /// The order already has the requested status, and asking again has no effect.
    Unchanged,
    Rejected,
}

/// The transition table for status changes requested through an order update.
pub fn status_outcome(current: OrderStatusType, requested: OrderStatusType) -> StatusOutcome {
    use StatusOutcome::*;
    match (current, requested) {
        (Pending, Paid) => Advance(Paid),
        (Paid, Paid) => Unchanged,
        (Paid, Shipped) => Advance(Shipped),
        // PENDING is the initial state and CANCELED is only entered by deletion
        (Pending, Pending | Shipped | Canceled) => Rejected,
        (Paid, Pending | Canceled) => Rejected,
        (Shipped, Pending | Paid | Shipped | Canceled) => Rejected,
        (Canceled, Pending | Paid | Shipped | Canceled) => Rejected,
    }
}

/// Whether an order in the given status may still have its quantity changed.
pub fn quantity_is_mutable(status: OrderStatusType) -> bool {
    match status {
        Pending | Paid => true,
        Shipped | Canceled => false,
    }
}

pub fn validate_quantity(quantity: i64) -> Result<(), InventoryError> {
    if quantity > 0 {
        Ok(())
    } else {
        Err(InventoryError::InvalidQuantity(quantity))
    }
}

/// The writes needed to carry out an accepted order update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderPlan {
    pub new_status: Option<OrderStatusType>,
    pub new_quantity: Option<i64>,
    /// The signed change to the product's stock. Negative values reserve additional units.
    pub stock_delta: i64,
}

impl OrderPlan {
    pub fn is_noop(&self) -> bool {
        self.new_status.is_none() && self.new_quantity.is_none()
    }
}

/// Checks a requested update against the current order.
///
/// The status rule is applied first. The quantity rule is then evaluated against the status the order *will* have,
/// so a request that ships an order and changes its quantity at the same time is rejected as a whole.
pub fn plan_modification(order: &Order, request: &ModifyOrderRequest) -> Result<OrderPlan, InventoryError> {
    let mut plan = OrderPlan::default();
    let mut status = order.status;
    if let Some(requested) = request.new_status {
        match status_outcome(order.status, requested) {
            StatusOutcome::Advance(next) => {
                plan.new_status = Some(next);
                status = next;
            },
            StatusOutcome::Unchanged => {},
            StatusOutcome::Rejected => {
                return Err(InventoryError::InvalidTransition { order_id: order.id, from: order.status, to: requested })
            },
        }
    }
    if let Some(quantity) = request.new_quantity {
        if !quantity_is_mutable(status) {
            let err = match plan.new_status {
                Some(to) => InventoryError::InvalidTransition { order_id: order.id, from: order.status, to },
                None => InventoryError::QuantityLocked { order_id: order.id, status },
            };
            return Err(err);
        }
        validate_quantity(quantity)?;
        if quantity != order.quantity {
            plan.new_quantity = Some(quantity);
            plan.stock_delta = order.quantity - quantity;
        }
    }
    Ok(plan)
}

/// Deleting an order cancels it. On success, returns the number of units to hand back to the product's stock.
pub fn plan_deletion(order: &Order) -> Result<i64, InventoryError> {
    match order.status {
        Pending => Ok(order.quantity),
        Paid | Shipped | Canceled => Err(InventoryError::OrderNotPending(order.id, order.status)),
    }
}
