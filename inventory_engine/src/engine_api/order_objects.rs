use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::db_types::{Order, OrderStatusType};

//--------------------------------------   ModifyOrderRequest  ---------------------------------------------------------
/// A request to change the status and/or the quantity of an existing order. Fields that are `None` are left alone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifyOrderRequest {
    pub new_status: Option<OrderStatusType>,
    pub new_quantity: Option<i64>,
}

impl ModifyOrderRequest {
    pub fn with_new_status(mut self, status: OrderStatusType) -> Self {
        self.new_status = Some(status);
        self
    }

    pub fn with_new_quantity(mut self, quantity: i64) -> Self {
        self.new_quantity = Some(quantity);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.new_status.is_none() && self.new_quantity.is_none()
    }
}

impl Display for ModifyOrderRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return write!(f, "No changes.");
        }
        if let Some(status) = self.new_status {
            write!(f, "status: {status}. ")?;
        }
        if let Some(quantity) = self.new_quantity {
            write!(f, "quantity: {quantity}. ")?;
        }
        Ok(())
    }
}

//--------------------------------------      OrderChanged     ---------------------------------------------------------
/// The before and after views of an order that went through an update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderChanged {
    pub old_order: Order,
    pub new_order: Order,
}

impl OrderChanged {
    pub fn new(old_order: Order, new_order: Order) -> Self {
        Self { old_order, new_order }
    }

    /// An update that resolved to a no-op (e.g. marking a PAID order as PAID) leaves both views identical.
    pub fn is_changed(&self) -> bool {
        self.old_order != self.new_order
    }
}

//--------------------------------------    OrderQueryFilter   ---------------------------------------------------------
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrderQueryFilter {
    pub product_id: Option<i64>,
    pub status: Option<Vec<OrderStatusType>>,
}

impl OrderQueryFilter {
    pub fn with_product_id(mut self, product_id: i64) -> Self {
        self.product_id = Some(product_id);
        self
    }

    pub fn with_status(mut self, status: OrderStatusType) -> Self {
        match self.status.as_mut() {
            Some(statuses) => statuses.push(status),
            None => self.status = Some(vec![status]),
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.product_id.is_none() && self.status.as_ref().map(|s| s.is_empty()).unwrap_or(true)
    }
}

impl Display for OrderQueryFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return write!(f, "No filters.");
        }
        if let Some(product_id) = &self.product_id {
            write!(f, "product_id: {product_id}. ")?;
        }
        if let Some(statuses) = &self.status {
            let statuses = statuses.iter().map(|s| s.to_string()).collect::<Vec<String>>().join(",");
            write!(f, "statuses: [{statuses}]. ")?;
        }
        Ok(())
    }
}
