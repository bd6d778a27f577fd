use crate::traits::{InventoryError, OrderManagement, ProductManagement};

/// The complete set of behaviour a backend needs to support the inventory engine.
#[allow(async_fn_in_trait)]
pub trait InventoryDatabase: Clone + ProductManagement + OrderManagement {
    /// The URL of the database
    fn url(&self) -> &str;

    /// Closes all connections to the backend. Pending work is allowed to finish first.
    async fn close(&mut self) -> Result<(), InventoryError> {
        Ok(())
    }
}
