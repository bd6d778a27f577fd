//! `SqliteDatabase` is a concrete implementation of an inventory engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the [`crate::traits`] module.
//!
//! Every operation that touches more than one row runs inside its own transaction. Transactions are only committed at
//! the end of the happy path; returning early with an error drops the transaction, which rolls it back.
use std::fmt::Debug;

use log::*;
use sqlx::{migrate::MigrateDatabase, Sqlite, SqlitePool};

use super::db::{new_pool, orders, products};
use crate::{
    db_types::{NewOrder, NewProduct, Order, OrderStatusType, Product, ProductUpdate},
    engine_api::order_objects::{ModifyOrderRequest, OrderChanged, OrderQueryFilter},
    order_lifecycle,
    traits::{InventoryDatabase, InventoryError, OrderManagement, ProductManagement},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl InventoryDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn close(&mut self) -> Result<(), InventoryError> {
        self.pool.close().await;
        Ok(())
    }
}

impl ProductManagement for SqliteDatabase {
    async fn insert_product(&self, product: NewProduct) -> Result<Product, InventoryError> {
        let mut tx = self.pool.begin().await?;
        if products::fetch_product_by_sku(&product.sku, &mut tx).await?.is_some() {
            return Err(InventoryError::DuplicateSku(product.sku));
        }
        let product = products::insert_product(product, &mut tx).await?;
        tx.commit().await?;
        Ok(product)
    }

    async fn fetch_product(&self, id: i64) -> Result<Option<Product>, InventoryError> {
        let mut conn = self.pool.acquire().await?;
        let product = products::fetch_product(id, &mut conn).await?;
        Ok(product)
    }

    async fn fetch_products(&self) -> Result<Vec<Product>, InventoryError> {
        let mut conn = self.pool.acquire().await?;
        let products = products::fetch_products(&mut conn).await?;
        Ok(products)
    }

    async fn update_product(&self, id: i64, update: ProductUpdate) -> Result<Product, InventoryError> {
        let mut tx = self.pool.begin().await?;
        let product = products::fetch_product(id, &mut tx).await?.ok_or(InventoryError::ProductNotFound(id))?;
        if let Some(sku) = update.sku.as_ref().filter(|&sku| sku != &product.sku) {
            if products::fetch_product_by_sku(sku, &mut tx).await?.is_some() {
                return Err(InventoryError::DuplicateSku(sku.clone()));
            }
        }
        let updated = products::update_product(id, update, &mut tx).await?.ok_or(InventoryError::ProductNotFound(id))?;
        tx.commit().await?;
        debug!("🗃️ Product #{id} updated");
        Ok(updated)
    }

    async fn delete_product(&self, id: i64) -> Result<(), InventoryError> {
        let mut tx = self.pool.begin().await?;
        if products::fetch_product(id, &mut tx).await?.is_none() {
            return Err(InventoryError::ProductNotFound(id));
        }
        let order_count = orders::count_orders_for_product(id, &mut tx).await?;
        if order_count > 0 {
            return Err(InventoryError::ProductHasOrders(id, order_count));
        }
        products::delete_product(id, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Product #{id} deleted");
        Ok(())
    }
}

impl OrderManagement for SqliteDatabase {
    async fn fetch_order(&self, id: i64) -> Result<Option<Order>, InventoryError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order(id, &mut conn).await?;
        Ok(order)
    }

    async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, InventoryError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::search_orders(query, &mut conn).await?;
        Ok(orders)
    }

    /// Takes a new order, and in a single atomic transaction,
    /// * reserves the ordered quantity from the product's stock, failing if there is not enough of it,
    /// * stores the order with status `PENDING`.
    async fn place_order(&self, order: NewOrder) -> Result<(Order, Product), InventoryError> {
        order_lifecycle::validate_quantity(order.quantity)?;
        let mut tx = self.pool.begin().await?;
        let product = products::reserve(order.product_id, order.quantity, &mut tx).await?;
        let order = orders::insert_order(order, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Order #{} placed. Product #{} has {} units left", order.id, product.id, product.stock);
        Ok((order, product))
    }

    async fn modify_order(&self, id: i64, request: ModifyOrderRequest) -> Result<OrderChanged, InventoryError> {
        let mut tx = self.pool.begin().await?;
        let old_order = orders::fetch_order(id, &mut tx).await?.ok_or(InventoryError::OrderNotFound(id))?;
        let plan = order_lifecycle::plan_modification(&old_order, &request)?;
        if plan.is_noop() {
            trace!("🗃️ Update [{request}] leaves order #{id} unchanged");
            return Ok(OrderChanged::new(old_order.clone(), old_order));
        }
        if plan.stock_delta != 0 {
            products::adjust(old_order.product_id, plan.stock_delta, &mut tx).await?;
        }
        let new_order = orders::update_order(id, &plan, &mut tx).await?.ok_or(InventoryError::OrderNotFound(id))?;
        tx.commit().await?;
        debug!("🗃️ Order #{id} updated: [{request}]");
        Ok(OrderChanged::new(old_order, new_order))
    }

    async fn remove_order(&self, id: i64) -> Result<Order, InventoryError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::fetch_order(id, &mut tx).await?.ok_or(InventoryError::OrderNotFound(id))?;
        let released = order_lifecycle::plan_deletion(&order)?;
        let product = products::release(order.product_id, released, &mut tx).await?;
        orders::delete_order(id, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Order #{id} removed. {released} units returned to product #{}, which now has {}", product.id, product.stock);
        Ok(Order { status: OrderStatusType::Canceled, ..order })
    }
}

impl SqliteDatabase {
    /// Connects to the database at `url` with a pool of up to `max_connections` connections.
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    /// Creates the SQLite database file at `url` if it does not exist yet.
    pub async fn create_if_missing(url: &str) -> Result<(), InventoryError> {
        if !Sqlite::database_exists(url).await? {
            Sqlite::create_database(url).await?;
            info!("🗃️ Created Sqlite database {url}");
        }
        Ok(())
    }

    /// Brings the schema up to date by running the embedded migrations.
    pub async fn migrate(&self) -> Result<(), InventoryError> {
        sqlx::migrate!("./src/sqlite/migrations")
            .run(&self.pool)
            .await
            .map_err(|e| InventoryError::DatabaseError(format!("Error running DB migrations: {e}")))?;
        info!("🗃️ Migrations complete");
        Ok(())
    }
}
