use inv_common::Price;
use thiserror::Error;

use crate::db_types::OrderStatusType;

/// The broad classes of failure that callers of the inventory engine need to tell apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The referenced product or order does not exist.
    NotFound,
    /// The request breaks a business rule. Nothing was changed.
    Conflict,
    /// Concurrent writers got in the way. The same request may succeed if it is retried.
    Transient,
    /// Something is wrong with the backend itself.
    Internal,
}

#[derive(Debug, Clone, Error)]
pub enum InventoryError {
    #[error("We have an internal database engine (configuration/uptime etc.) error: {0}")]
    DatabaseError(String),
    #[error("The database is busy with a conflicting write. {0}")]
    StorageBusy(String),
    #[error("Gave up after {0} attempts because of conflicting writes. Please try again later.")]
    ContentionExhausted(u32),
    #[error("The requested product #{0} does not exist")]
    ProductNotFound(i64),
    #[error("The requested order #{0} does not exist")]
    OrderNotFound(i64),
    #[error("A product with SKU {0} already exists")]
    DuplicateSku(String),
    #[error("Insufficient stock for product #{product_id}. {requested} units requested, but only {available} available")]
    InsufficientStock { product_id: i64, requested: i64, available: i64 },
    #[error("Order #{order_id} cannot change from {from} to {to}")]
    InvalidTransition { order_id: i64, from: OrderStatusType, to: OrderStatusType },
    #[error("Order #{order_id} is {status}. Its quantity can no longer be changed")]
    QuantityLocked { order_id: i64, status: OrderStatusType },
    #[error("Quantity must be greater than zero, but {0} was given")]
    InvalidQuantity(i64),
    #[error("Order #{0} is {1}. Only PENDING orders can be deleted")]
    OrderNotPending(i64, OrderStatusType),
    #[error("Price must be greater than zero, but {0} was given")]
    InvalidPrice(Price),
    #[error("Stock cannot be negative, but {0} was given")]
    InvalidStock(i64),
    #[error("A product SKU cannot be empty")]
    EmptySku,
    #[error("Product #{0} is still referenced by {1} order(s) and cannot be deleted")]
    ProductHasOrders(i64, i64),
}

impl InventoryError {
    pub fn kind(&self) -> ErrorKind {
        use InventoryError::*;
        match self {
            ProductNotFound(_) | OrderNotFound(_) => ErrorKind::NotFound,
            DuplicateSku(_) |
            InsufficientStock { .. } |
            InvalidTransition { .. } |
            QuantityLocked { .. } |
            InvalidQuantity(_) |
            OrderNotPending(..) |
            InvalidPrice(_) |
            InvalidStock(_) |
            EmptySku |
            ProductHasOrders(..) => ErrorKind::Conflict,
            StorageBusy(_) | ContentionExhausted(_) => ErrorKind::Transient,
            DatabaseError(_) => ErrorKind::Internal,
        }
    }

    /// Only raw storage contention is eligible for an automatic retry. Once the retries are used up the error becomes
    /// [`InventoryError::ContentionExhausted`], which is still transient, but is not retried again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, InventoryError::StorageBusy(_))
    }
}

/// SQLite reports lock contention with the `SQLITE_BUSY` (5) and `SQLITE_LOCKED` (6) primary result codes. The
/// extended codes (e.g. `SQLITE_BUSY_SNAPSHOT` = 517) carry the primary code in the low byte.
fn is_contention_code(code: Option<&str>) -> bool {
    code.and_then(|c| c.parse::<i32>().ok()).map(|c| matches!(c & 0xff, 5 | 6)).unwrap_or(false)
}

impl From<sqlx::Error> for InventoryError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db) if is_contention_code(db.code().as_deref()) => {
                InventoryError::StorageBusy(e.to_string())
            },
            sqlx::Error::PoolTimedOut => InventoryError::StorageBusy(e.to_string()),
            _ => InventoryError::DatabaseError(e.to_string()),
        }
    }
}
