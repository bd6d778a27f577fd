use chrono::Utc;
use log::{debug, trace};
use sqlx::{sqlite::SqliteRow, FromRow, QueryBuilder, SqliteConnection};

use crate::{
    db_types::{NewOrder, Order},
    engine_api::order_objects::OrderQueryFilter,
    order_lifecycle::OrderPlan,
};

/// Inserts a new `PENDING` order using the given connection. This is not atomic. Embed the call inside a transaction
/// alongside the stock reservation and pass `&mut *tx` as the connection argument.
pub async fn insert_order(order: NewOrder, conn: &mut SqliteConnection) -> Result<Order, sqlx::Error> {
    let order: Order = sqlx::query_as(
        r#"
            INSERT INTO orders (product_id, quantity, status, created_at)
            VALUES ($1, $2, 'PENDING', $3)
            RETURNING *;
        "#,
    )
    .bind(order.product_id)
    .bind(order.quantity)
    .bind(Utc::now())
    .fetch_one(conn)
    .await?;
    debug!("📦️ Order #{} inserted for {} x product #{}", order.id, order.quantity, order.product_id);
    Ok(order)
}

pub async fn fetch_order(id: i64, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(order)
}

/// Fetches orders according to criteria specified in the `OrderQueryFilter`
///
/// Resulting orders are ordered by `created_at` in ascending order
pub async fn search_orders(query: OrderQueryFilter, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let mut builder = QueryBuilder::new("SELECT * FROM orders ");
    if !query.is_empty() {
        builder.push("WHERE ");
    }
    let mut where_clause = builder.separated(" AND ");
    if let Some(product_id) = query.product_id {
        where_clause.push("product_id = ");
        where_clause.push_bind_unseparated(product_id);
    }
    if let Some(statuses) = query.status.filter(|s| !s.is_empty()) {
        // Statuses come from a closed enum, so they are safe to inline
        let status_clause = statuses.iter().map(|s| format!("'{s}'")).collect::<Vec<String>>().join(",");
        where_clause.push(format!("status IN ({status_clause})"));
    }
    builder.push(" ORDER BY created_at ASC, id ASC");
    trace!("📦️ Executing query: {}", builder.sql());
    let orders = builder.build_query_as::<Order>().fetch_all(conn).await?;
    trace!("📦️ Result of search_orders: {}", orders.len());
    Ok(orders)
}

/// Writes the status and quantity from an accepted [`OrderPlan`]. The accompanying stock change is the caller's job.
///
/// Returns `None` if the order does not exist.
pub async fn update_order(id: i64, plan: &OrderPlan, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    if plan.is_noop() {
        debug!("📦️ No fields to update for order #{id}. Update request skipped.");
        return fetch_order(id, conn).await;
    }
    let mut builder = QueryBuilder::new("UPDATE orders SET ");
    let mut set_clause = builder.separated(", ");
    if let Some(status) = plan.new_status {
        set_clause.push("status = ");
        set_clause.push_bind_unseparated(status.to_string());
    }
    if let Some(quantity) = plan.new_quantity {
        set_clause.push("quantity = ");
        set_clause.push_bind_unseparated(quantity);
    }
    builder.push(" WHERE id = ");
    builder.push_bind(id);
    builder.push(" RETURNING *");
    trace!("📦️ Executing query: {}", builder.sql());
    let res = builder.build().fetch_optional(conn).await?.map(|row: SqliteRow| Order::from_row(&row)).transpose()?;
    trace!("📦️ Result of update_order: {res:?}");
    Ok(res)
}

/// Returns `true` if an order was deleted.
pub async fn delete_order(id: i64, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM orders WHERE id = $1").bind(id).execute(conn).await?;
    Ok(result.rows_affected() > 0)
}

pub async fn count_orders_for_product(product_id: i64, conn: &mut SqliteConnection) -> Result<i64, sqlx::Error> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE product_id = $1").bind(product_id).fetch_one(conn).await?;
    Ok(count)
}
