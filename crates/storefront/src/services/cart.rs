//! Cart service.
//!
//! Every operation works on the caller's single active cart. Writes lock the
//! cart row first, so they serialize with order placement for the same user.

use sqlx::PgPool;
use thiserror::Error;
use tracing::instrument;

use kedai_core::{CartItemId, CheckoutError, ProductId, Quantity, UserId};

use crate::db::{RepositoryError, carts};
use crate::models::CartView;

/// Errors that can occur during cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// Unknown or inactive product.
    #[error("product not found")]
    ProductNotFound,

    /// The line is not in the caller's active cart.
    #[error("cart item not found")]
    ItemNotFound,

    /// An update with neither `qty` nor `note`.
    #[error("nothing to update")]
    NothingToUpdate,

    /// Merging would push a line past [`Quantity::MAX`].
    #[error("qty must be at most {} per line", Quantity::MAX)]
    QuantityTooLarge,

    #[error(transparent)]
    Amount(#[from] CheckoutError),

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<sqlx::Error> for CartError {
    fn from(e: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(e))
    }
}

/// Cart operations for one user at a time.
pub struct CartService<'a> {
    pool: &'a PgPool,
}

impl<'a> CartService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// The caller's active cart, created empty if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Repository` if the database operation fails.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn view(&self, user_id: UserId) -> Result<CartView, CartError> {
        let mut tx = self.pool.begin().await?;
        let cart_id = carts::ensure_active(&mut tx, user_id).await?;
        let rows = carts::items(&mut tx, cart_id).await?;
        tx.commit().await?;

        Ok(CartView::build(cart_id, rows)?)
    }

    /// Add `qty` of a product. Adding a product already in the cart increases
    /// that line's quantity and keeps the price captured on first add.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ProductNotFound` for an unknown or inactive product.
    /// Returns `CartError::QuantityTooLarge` if the merged line would overflow.
    /// Returns `CartError::Repository` if the database operation fails.
    #[instrument(skip(self), fields(user_id = %user_id, product_id = %product_id, qty = %qty))]
    pub async fn add_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
        qty: Quantity,
    ) -> Result<CartView, CartError> {
        let mut tx = self.pool.begin().await?;

        let cart_id = carts::ensure_active(&mut tx, user_id).await?;
        let price = carts::orderable_price(&mut tx, product_id)
            .await?
            .ok_or(CartError::ProductNotFound)?;
        if !carts::add_or_merge(&mut tx, cart_id, product_id, qty, price).await? {
            return Err(CartError::QuantityTooLarge);
        }
        let rows = carts::items(&mut tx, cart_id).await?;

        tx.commit().await?;

        tracing::debug!(cart_id = %cart_id, "Cart item added");
        Ok(CartView::build(cart_id, rows)?)
    }

    /// Change the quantity and/or note of a line in the caller's active cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError::NothingToUpdate` if both fields are `None`.
    /// Returns `CartError::ItemNotFound` if the line is not in the active cart.
    #[instrument(skip(self, note), fields(user_id = %user_id, item_id = %item_id))]
    pub async fn update_item(
        &self,
        user_id: UserId,
        item_id: CartItemId,
        qty: Option<Quantity>,
        note: Option<&str>,
    ) -> Result<CartView, CartError> {
        if qty.is_none() && note.is_none() {
            return Err(CartError::NothingToUpdate);
        }

        let mut tx = self.pool.begin().await?;

        let cart_id = carts::lock_active(&mut tx, user_id)
            .await?
            .ok_or(CartError::ItemNotFound)?;
        if !carts::update_item(&mut tx, cart_id, item_id, qty, note).await? {
            return Err(CartError::ItemNotFound);
        }
        let rows = carts::items(&mut tx, cart_id).await?;

        tx.commit().await?;

        Ok(CartView::build(cart_id, rows)?)
    }

    /// Remove a line from the caller's active cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ItemNotFound` if the line is not in the active cart.
    #[instrument(skip(self), fields(user_id = %user_id, item_id = %item_id))]
    pub async fn remove_item(
        &self,
        user_id: UserId,
        item_id: CartItemId,
    ) -> Result<CartView, CartError> {
        let mut tx = self.pool.begin().await?;

        let cart_id = carts::lock_active(&mut tx, user_id)
            .await?
            .ok_or(CartError::ItemNotFound)?;
        if !carts::remove_item(&mut tx, cart_id, item_id).await? {
            return Err(CartError::ItemNotFound);
        }
        let rows = carts::items(&mut tx, cart_id).await?;

        tx.commit().await?;

        Ok(CartView::build(cart_id, rows)?)
    }
}
