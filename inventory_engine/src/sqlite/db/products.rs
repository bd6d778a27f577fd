//! Products and the stock ledger.
//!
//! Stock is only ever changed through [`adjust_stock`], a single conditional `UPDATE` that refuses to take the stock
//! below zero. Two writers racing for the last units therefore cannot both succeed, whatever order their reads ran in.
use log::{debug, trace};
use sqlx::{sqlite::SqliteRow, FromRow, QueryBuilder, SqliteConnection};

use crate::{
    db_types::{NewProduct, Product, ProductUpdate},
    traits::InventoryError,
};

fn map_unique_violation(e: sqlx::Error, sku: &str) -> InventoryError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => InventoryError::DuplicateSku(sku.to_string()),
        _ => InventoryError::from(e),
    }
}

/// Inserts a new product. This is not atomic on its own; wrap it in a transaction together with the SKU check.
pub async fn insert_product(product: NewProduct, conn: &mut SqliteConnection) -> Result<Product, InventoryError> {
    let sku = product.sku.clone();
    let product: Product =
        sqlx::query_as("INSERT INTO products (sku, name, price, stock) VALUES ($1, $2, $3, $4) RETURNING *")
            .bind(product.sku)
            .bind(product.name)
            .bind(product.price.value())
            .bind(product.stock)
            .fetch_one(conn)
            .await
            .map_err(|e| map_unique_violation(e, &sku))?;
    debug!("🏷️ Product [{}] inserted with id {}", product.sku, product.id);
    Ok(product)
}

pub async fn fetch_product(id: i64, conn: &mut SqliteConnection) -> Result<Option<Product>, sqlx::Error> {
    let product = sqlx::query_as("SELECT * FROM products WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(product)
}

pub async fn fetch_product_by_sku(sku: &str, conn: &mut SqliteConnection) -> Result<Option<Product>, sqlx::Error> {
    let product = sqlx::query_as("SELECT * FROM products WHERE sku = $1").bind(sku).fetch_optional(conn).await?;
    Ok(product)
}

pub async fn fetch_products(conn: &mut SqliteConnection) -> Result<Vec<Product>, sqlx::Error> {
    let products = sqlx::query_as("SELECT * FROM products ORDER BY id").fetch_all(conn).await?;
    Ok(products)
}

/// Applies the non-empty fields of `update` to the product. Returns `None` if the product does not exist.
pub async fn update_product(
    id: i64,
    update: ProductUpdate,
    conn: &mut SqliteConnection,
) -> Result<Option<Product>, InventoryError> {
    if update.is_empty() {
        debug!("🏷️ No fields to update for product #{id}. Returning it unchanged.");
        return Ok(fetch_product(id, conn).await?);
    }
    let sku = update.sku.clone().unwrap_or_default();
    let mut builder = QueryBuilder::new("UPDATE products SET ");
    let mut set_clause = builder.separated(", ");
    if let Some(sku) = update.sku {
        set_clause.push("sku = ");
        set_clause.push_bind_unseparated(sku);
    }
    if let Some(name) = update.name {
        set_clause.push("name = ");
        set_clause.push_bind_unseparated(name);
    }
    if let Some(price) = update.price {
        set_clause.push("price = ");
        set_clause.push_bind_unseparated(price.value());
    }
    if let Some(stock) = update.stock {
        set_clause.push("stock = ");
        set_clause.push_bind_unseparated(stock);
    }
    builder.push(" WHERE id = ");
    builder.push_bind(id);
    builder.push(" RETURNING *");
    trace!("🏷️ Executing query: {}", builder.sql());
    let res = builder
        .build()
        .fetch_optional(conn)
        .await
        .map_err(|e| map_unique_violation(e, &sku))?
        .map(|row: SqliteRow| Product::from_row(&row))
        .transpose()?;
    Ok(res)
}

/// Returns `true` if a product was deleted.
pub async fn delete_product(id: i64, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM products WHERE id = $1").bind(id).execute(conn).await?;
    Ok(result.rows_affected() > 0)
}

/// Applies a signed `delta` to the product's stock, provided the result is not negative.
///
/// Returns `None` if the product does not exist *or* if the adjustment was refused. Use [`adjust`] if you need to tell
/// the two apart.
pub async fn adjust_stock(id: i64, delta: i64, conn: &mut SqliteConnection) -> Result<Option<Product>, sqlx::Error> {
    let product = sqlx::query_as("UPDATE products SET stock = stock + $1 WHERE id = $2 AND stock + $1 >= 0 RETURNING *")
        .bind(delta)
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(product)
}

/// Applies a signed `delta` to the product's stock, failing with [`InventoryError::InsufficientStock`] if the result
/// would be negative.
pub async fn adjust(id: i64, delta: i64, conn: &mut SqliteConnection) -> Result<Product, InventoryError> {
    match adjust_stock(id, delta, conn).await? {
        Some(product) => {
            trace!("🏷️ Stock for product #{id} adjusted by {delta}. {} units remain", product.stock);
            Ok(product)
        },
        None => {
            let product = fetch_product(id, conn).await?.ok_or(InventoryError::ProductNotFound(id))?;
            debug!("🏷️ Refusing to adjust stock of product #{id} by {delta}. Only {} units available", product.stock);
            Err(InventoryError::InsufficientStock { product_id: id, requested: -delta, available: product.stock })
        },
    }
}

/// Takes `quantity` units out of the product's stock.
pub async fn reserve(id: i64, quantity: i64, conn: &mut SqliteConnection) -> Result<Product, InventoryError> {
    if quantity <= 0 {
        return Err(InventoryError::InvalidQuantity(quantity));
    }
    adjust(id, -quantity, conn).await
}

/// Returns `quantity` units to the product's stock.
pub async fn release(id: i64, quantity: i64, conn: &mut SqliteConnection) -> Result<Product, InventoryError> {
    if quantity < 0 {
        return Err(InventoryError::InvalidQuantity(quantity));
    }
    let product = adjust_stock(id, quantity, conn).await?.ok_or(InventoryError::ProductNotFound(id))?;
    Ok(product)
}
