//! Order service.
//!
//! [`OrderService::place_order`] turns the caller's active cart into an order
//! in a single database transaction:
//!
//! 1. lock the active cart row (`FOR UPDATE`)
//! 2. read its lines with current product names and captured prices
//! 3. plan items and totals ([`kedai_core::plan_order`])
//! 4. insert the order (`pending`) and its items
//! 5. close the cart (`ordered`)
//!
//! Any failure drops the transaction, which rolls everything back. A second
//! placement racing the first blocks on the row lock and then finds no active
//! cart, so it fails with `EmptyCart` instead of ordering twice.

use sqlx::PgPool;
use thiserror::Error;
use tracing::instrument;

use kedai_core::{CheckoutError, OrderId, UserId, plan_order};

use crate::db::{OrderRepository, RepositoryError, carts, orders};
use crate::models::{AdminOrderSummary, CurrentUser, OrderDetail, OrderSummary, PlacedOrder};

/// Errors that can occur during order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    /// No active cart, or an active cart with no lines.
    #[error("cart is empty")]
    EmptyCart,

    #[error("order total is out of range")]
    AmountOutOfRange,

    #[error("order not found")]
    NotFound,

    /// The caller neither owns the order nor is an admin.
    #[error("not allowed to view this order")]
    Forbidden,

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<CheckoutError> for OrderError {
    fn from(e: CheckoutError) -> Self {
        match e {
            CheckoutError::EmptyCart => Self::EmptyCart,
            CheckoutError::AmountOutOfRange => Self::AmountOutOfRange,
        }
    }
}

impl From<sqlx::Error> for OrderError {
    fn from(e: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(e))
    }
}

/// Order placement and queries.
pub struct OrderService<'a> {
    pool: &'a PgPool,
    orders: OrderRepository<'a>,
}

impl<'a> OrderService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            pool,
            orders: OrderRepository::new(pool),
        }
    }

    /// Place an order from the user's active cart.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::EmptyCart` if there is no active cart or it has no
    /// lines; nothing is written in that case.
    /// Returns `OrderError::AmountOutOfRange` if a total overflows.
    /// Returns `OrderError::Repository` if the database operation fails.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn place_order(&self, user_id: UserId) -> Result<PlacedOrder, OrderError> {
        let mut tx = self.pool.begin().await?;

        let cart_id = carts::lock_active(&mut tx, user_id)
            .await?
            .ok_or(OrderError::EmptyCart)?;
        let lines = carts::checkout_lines(&mut tx, cart_id).await?;
        let draft = plan_order(&lines)?;

        let order_id = OrderId::new_v4();
        orders::insert_order(&mut tx, order_id, user_id, &draft.totals).await?;
        orders::insert_items(&mut tx, order_id, &draft.items).await?;

        // The row lock makes this always succeed; a miss means the lock was bypassed
        if !carts::mark_ordered(&mut tx, cart_id).await? {
            return Err(RepositoryError::Conflict("cart is no longer active".to_owned()).into());
        }

        tx.commit().await?;

        tracing::info!(
            order_id = %order_id,
            cart_id = %cart_id,
            items = draft.items.len(),
            total = %draft.totals.total,
            "Order placed"
        );

        Ok(PlacedOrder {
            id: order_id,
            subtotal: draft.totals.subtotal,
            total: draft.totals.total,
        })
    }

    /// The caller's own orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Repository` if the database operation fails.
    pub async fn list_for(&self, user_id: UserId) -> Result<Vec<OrderSummary>, OrderError> {
        Ok(self.orders.list_for_user(user_id).await?)
    }

    /// Every order, newest first.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Repository` if the database operation fails.
    pub async fn list_all(&self) -> Result<Vec<AdminOrderSummary>, OrderError> {
        Ok(self.orders.list_all().await?)
    }

    /// One order with its items.
    ///
    /// Existence is checked before ownership, so a missing order is a 404 for
    /// everyone.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NotFound` if the order does not exist.
    /// Returns `OrderError::Forbidden` unless the caller owns it or is an admin.
    pub async fn detail_for(
        &self,
        caller: &CurrentUser,
        id: OrderId,
    ) -> Result<OrderDetail, OrderError> {
        let detail = self
            .orders
            .get_detail(id)
            .await?
            .ok_or(OrderError::NotFound)?;

        if detail.order.user_id != caller.id && !caller.is_admin() {
            return Err(OrderError::Forbidden);
        }
        Ok(detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkout_errors_map_one_to_one() {
        assert!(matches!(
            OrderError::from(CheckoutError::EmptyCart),
            OrderError::EmptyCart
        ));
        assert!(matches!(
            OrderError::from(CheckoutError::AmountOutOfRange),
            OrderError::AmountOutOfRange
        ));
    }
}
