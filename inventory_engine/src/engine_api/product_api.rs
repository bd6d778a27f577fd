use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{NewProduct, Product, ProductUpdate},
    helpers::RetryPolicy,
    traits::{InventoryError, ProductManagement},
};

/// `ProductApi` manages the product catalogue. Stock levels can be set directly here; day-to-day stock movements
/// happen as a side effect of the order flow (see [`crate::OrderFlowApi`]).
pub struct ProductApi<B> {
    db: B,
    retry: RetryPolicy,
}

impl<B> Debug for ProductApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ProductApi ({:?})", self.retry)
    }
}

impl<B> ProductApi<B> {
    pub fn new(db: B) -> Self {
        Self { db, retry: RetryPolicy::default() }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

impl<B> ProductApi<B>
where B: ProductManagement
{
    pub async fn create_product(&self, product: NewProduct) -> Result<Product, InventoryError> {
        validate_new_product(&product)?;
        let product = self.retry.run("create product", || self.db.insert_product(product.clone())).await?;
        info!("🏷️ Product [{}] created as #{} with {} units in stock", product.sku, product.id, product.stock);
        Ok(product)
    }

    pub async fn product(&self, id: i64) -> Result<Product, InventoryError> {
        self.retry.run("fetch product", || self.db.fetch_product(id)).await?.ok_or(InventoryError::ProductNotFound(id))
    }

    pub async fn products(&self) -> Result<Vec<Product>, InventoryError> {
        self.retry.run("fetch products", || self.db.fetch_products()).await
    }

    pub async fn update_product(&self, id: i64, update: ProductUpdate) -> Result<Product, InventoryError> {
        validate_product_update(&update)?;
        let product = self.retry.run("update product", || self.db.update_product(id, update.clone())).await?;
        debug!("🏷️ Product #{id} updated");
        Ok(product)
    }

    pub async fn delete_product(&self, id: i64) -> Result<(), InventoryError> {
        self.retry.run("delete product", || self.db.delete_product(id)).await?;
        info!("🏷️ Product #{id} deleted");
        Ok(())
    }
}

fn validate_sku(sku: &str) -> Result<(), InventoryError> {
    if sku.trim().is_empty() {
        return Err(InventoryError::EmptySku);
    }
    Ok(())
}

fn validate_new_product(product: &NewProduct) -> Result<(), InventoryError> {
    validate_sku(&product.sku)?;
    if !product.price.is_valid() {
        return Err(InventoryError::InvalidPrice(product.price));
    }
    if product.stock < 0 {
        return Err(InventoryError::InvalidStock(product.stock));
    }
    Ok(())
}

fn validate_product_update(update: &ProductUpdate) -> Result<(), InventoryError> {
    if let Some(sku) = &update.sku {
        validate_sku(sku)?;
    }
    match (update.price, update.stock) {
        (Some(price), _) if !price.is_valid() => Err(InventoryError::InvalidPrice(price)),
        (_, Some(stock)) if stock < 0 => Err(InventoryError::InvalidStock(stock)),
        _ => Ok(()),
    }
}
