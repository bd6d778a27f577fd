//! # Backend contracts
//!
//! This module defines the behaviour that a storage backend must provide to act as the store for the inventory engine.
//!
//! * [`ProductManagement`] covers the product catalogue and its stock ledger.
//! * [`OrderManagement`] covers the order records and every operation that couples an order change with a stock
//!   change. Implementations must perform each of those operations as a single atomic unit of work.
//! * [`InventoryDatabase`] ties the two together and is what the engine APIs are usually generic over.
//!
//! All methods report failures as [`InventoryError`]s, which can be classified with [`InventoryError::kind`].
mod errors;
mod inventory_database;
mod order_management;
mod product_management;

pub use errors::{ErrorKind, InventoryError};
pub use inventory_database::InventoryDatabase;
pub use order_management::OrderManagement;
pub use product_management::ProductManagement;
