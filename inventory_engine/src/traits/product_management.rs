use crate::{
    db_types::{NewProduct, Product, ProductUpdate},
    traits::InventoryError,
};

/// Product catalogue operations.
///
/// Input validation (positive prices, non-negative stock) happens in the API layer before these methods are called.
/// Implementations are responsible for the rules that depend on stored state, such as SKU uniqueness.
#[allow(async_fn_in_trait)]
pub trait ProductManagement {
    /// Stores a new product. Fails with [`InventoryError::DuplicateSku`] if the SKU is already in use.
    async fn insert_product(&self, product: NewProduct) -> Result<Product, InventoryError>;

    async fn fetch_product(&self, id: i64) -> Result<Option<Product>, InventoryError>;

    /// All products, ordered by id.
    async fn fetch_products(&self) -> Result<Vec<Product>, InventoryError>;

    /// Applies a partial update. Changing the SKU to one that belongs to another product fails with
    /// [`InventoryError::DuplicateSku`].
    async fn update_product(&self, id: i64, update: ProductUpdate) -> Result<Product, InventoryError>;

    /// Deletes the product. Products that are still referenced by any order cannot be deleted, and the call fails
    /// with [`InventoryError::ProductHasOrders`].
    async fn delete_product(&self, id: i64) -> Result<(), InventoryError>;
}
