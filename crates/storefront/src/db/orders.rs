//! Order persistence.
//!
//! Orders are only ever inserted (inside the placement transaction) and read.

use sqlx::{PgConnection, PgPool};

use kedai_core::{DraftItem, OrderId, OrderItemId, OrderTotals, UserId};

use super::RepositoryError;
use crate::models::{AdminOrderSummary, Order, OrderDetail, OrderItem, OrderSummary};

/// Insert the order header with status `pending`.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the insert fails.
pub async fn insert_order(
    conn: &mut PgConnection,
    order_id: OrderId,
    user_id: UserId,
    totals: &OrderTotals,
) -> Result<(), RepositoryError> {
    sqlx::query(
        r"
        INSERT INTO orders (id, user_id, status, subtotal, discount, tax, shipping_fee, total)
        VALUES ($1, $2, 'pending', $3, $4, $5, $6, $7)
        ",
    )
    .bind(order_id)
    .bind(user_id)
    .bind(totals.subtotal)
    .bind(totals.discount)
    .bind(totals.tax)
    .bind(totals.shipping_fee)
    .bind(totals.total)
    .execute(conn)
    .await?;
    Ok(())
}

/// Insert the order lines, numbered in cart order.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if an insert fails.
pub async fn insert_items(
    conn: &mut PgConnection,
    order_id: OrderId,
    items: &[DraftItem],
) -> Result<(), RepositoryError> {
    for (line_no, item) in (1_i32..).zip(items) {
        sqlx::query(
            r"
            INSERT INTO order_items
                (id, order_id, line_no, product_id, product_name, qty, price, subtotal)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ",
        )
        .bind(OrderItemId::new_v4())
        .bind(order_id)
        .bind(line_no)
        .bind(item.product_id)
        .bind(&item.product_name)
        .bind(item.qty)
        .bind(item.price)
        .bind(item.subtotal)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

/// Read side of orders.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// A user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<OrderSummary>, RepositoryError> {
        let orders = sqlx::query_as::<_, OrderSummary>(
            r"
            SELECT id, status, total, created_at
            FROM orders
            WHERE user_id = $1
            ORDER BY created_at DESC, id
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;
        Ok(orders)
    }

    /// Every order, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<AdminOrderSummary>, RepositoryError> {
        let orders = sqlx::query_as::<_, AdminOrderSummary>(
            r"
            SELECT o.id, o.user_id, u.username, o.status, o.total, o.created_at
            FROM orders o
            JOIN users u ON u.id = o.user_id
            ORDER BY o.created_at DESC, o.id
            ",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(orders)
    }

    /// An order with its lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_detail(&self, id: OrderId) -> Result<Option<OrderDetail>, RepositoryError> {
        let Some(order) = sqlx::query_as::<_, Order>(
            r"
            SELECT id, user_id, status, subtotal, discount, tax, shipping_fee, total, created_at
            FROM orders
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        else {
            return Ok(None);
        };

        let items = sqlx::query_as::<_, OrderItem>(
            r"
            SELECT product_id, product_name, qty, price, subtotal
            FROM order_items
            WHERE order_id = $1
            ORDER BY line_no
            ",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        Ok(Some(OrderDetail { order, items }))
    }
}
