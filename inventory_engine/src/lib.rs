//! Inventory Engine
//!
//! The inventory engine keeps product stock levels and order lifecycles consistent with one another, even when many
//! requests modify the same product at once. It also authenticates and applies payment notifications coming in from an
//! external provider.
//!
//! The library is divided into three main sections:
//! 1. Storage ([`traits`] and the SQLite backend, [`SqliteDatabase`]). Backends carry out each order change and its
//!    matching stock adjustment as a single unit of work. You should never need to access the database directly.
//!    The exception is the data types used in the database. These are defined in the [`db_types`] module and are
//!    public.
//! 2. The order state machine ([`order_lifecycle`]). A pure transition table that decides which status and quantity
//!    changes are legal, and what they do to stock.
//! 3. The engine public API ([`ProductApi`], [`OrderFlowApi`] and [`PaymentWebhookApi`]). This is what HTTP handlers
//!    and other callers use.
#[cfg(feature = "sqlite")]
mod sqlite;

pub mod db_types;
mod engine_api;
pub mod helpers;
pub mod order_lifecycle;
pub mod traits;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

pub use engine_api::{
    order_flow_api::OrderFlowApi,
    order_objects,
    product_api::ProductApi,
    webhook_api::PaymentWebhookApi,
    webhook_objects,
};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use traits::{ErrorKind, InventoryDatabase, InventoryError, OrderManagement, ProductManagement};
