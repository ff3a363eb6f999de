//! Cart persistence.
//!
//! Every function here runs on a caller-supplied connection so it can take
//! part in the caller's transaction. The active cart row is the lock that
//! serializes add-item and order placement for one user.

use sqlx::PgConnection;

use kedai_core::{CartId, CartItemId, CheckoutLine, Money, ProductId, Quantity, UserId};

use super::RepositoryError;
use crate::models::CartItemRow;

/// Lock the user's active cart row for the rest of the transaction.
///
/// A concurrent transaction that flips the cart to `ordered` first makes this
/// return `None` once it commits.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn lock_active(
    conn: &mut PgConnection,
    user_id: UserId,
) -> Result<Option<CartId>, RepositoryError> {
    let id = sqlx::query_scalar::<_, CartId>(
        "SELECT id FROM carts WHERE user_id = $1 AND status = 'active' FOR UPDATE",
    )
    .bind(user_id)
    .fetch_optional(conn)
    .await?;
    Ok(id)
}

/// Return the user's active cart, creating an empty one if needed, and lock it.
///
/// # Errors
///
/// Returns `RepositoryError::Conflict` if the cart was closed by a concurrent
/// order placement between the insert and the lock.
pub async fn ensure_active(
    conn: &mut PgConnection,
    user_id: UserId,
) -> Result<CartId, RepositoryError> {
    sqlx::query(
        r"
        INSERT INTO carts (id, user_id, status)
        VALUES ($1, $2, 'active')
        ON CONFLICT (user_id) WHERE status = 'active' DO NOTHING
        ",
    )
    .bind(CartId::new_v4())
    .bind(user_id)
    .execute(&mut *conn)
    .await?;

    lock_active(conn, user_id)
        .await?
        .ok_or_else(|| RepositoryError::Conflict("active cart changed concurrently".to_owned()))
}

/// Lines of a cart with current product names, oldest first.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn items(
    conn: &mut PgConnection,
    cart_id: CartId,
) -> Result<Vec<CartItemRow>, RepositoryError> {
    let rows = sqlx::query_as::<_, CartItemRow>(
        r"
        SELECT ci.id, ci.product_id, p.name, ci.qty, ci.price_at, ci.note, ci.created_at
        FROM cart_items ci
        JOIN products p ON p.id = ci.product_id
        WHERE ci.cart_id = $1
        ORDER BY ci.created_at, ci.id
        ",
    )
    .bind(cart_id)
    .fetch_all(conn)
    .await?;
    Ok(rows)
}

/// Cart lines in the shape the checkout planner consumes.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn checkout_lines(
    conn: &mut PgConnection,
    cart_id: CartId,
) -> Result<Vec<CheckoutLine>, RepositoryError> {
    let lines = items(conn, cart_id)
        .await?
        .into_iter()
        .map(|row| CheckoutLine {
            product_id: row.product_id,
            product_name: row.name,
            qty: row.qty,
            price_at: row.price_at,
        })
        .collect();
    Ok(lines)
}

/// Current price of a product that can be ordered.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn orderable_price(
    conn: &mut PgConnection,
    product_id: ProductId,
) -> Result<Option<Money>, RepositoryError> {
    let price = sqlx::query_scalar::<_, Money>(
        "SELECT price FROM products WHERE id = $1 AND is_active",
    )
    .bind(product_id)
    .fetch_optional(conn)
    .await?;
    Ok(price)
}

/// Add `qty` of a product, merging into an existing line.
///
/// A merge keeps the line's original `price_at`. Returns `false`, writing
/// nothing, when the merged quantity would exceed [`Quantity::MAX`].
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn add_or_merge(
    conn: &mut PgConnection,
    cart_id: CartId,
    product_id: ProductId,
    qty: Quantity,
    price: Money,
) -> Result<bool, RepositoryError> {
    let result = sqlx::query(
        r"
        INSERT INTO cart_items (id, cart_id, product_id, qty, price_at)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (cart_id, product_id)
        DO UPDATE SET qty = cart_items.qty + EXCLUDED.qty, updated_at = NOW()
        WHERE cart_items.qty <= $6 - EXCLUDED.qty
        ",
    )
    .bind(CartItemId::new_v4())
    .bind(cart_id)
    .bind(product_id)
    .bind(qty)
    .bind(price)
    .bind(Quantity::MAX)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Change quantity and/or note of a line in the given cart.
///
/// Returns `false` if the line is not in that cart.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn update_item(
    conn: &mut PgConnection,
    cart_id: CartId,
    item_id: CartItemId,
    qty: Option<Quantity>,
    note: Option<&str>,
) -> Result<bool, RepositoryError> {
    let result = sqlx::query(
        r"
        UPDATE cart_items SET
            qty = COALESCE($3, qty),
            note = COALESCE($4, note),
            updated_at = NOW()
        WHERE id = $1 AND cart_id = $2
        ",
    )
    .bind(item_id)
    .bind(cart_id)
    .bind(qty)
    .bind(note)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Remove a line from the given cart. Returns `false` if it was not there.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn remove_item(
    conn: &mut PgConnection,
    cart_id: CartId,
    item_id: CartItemId,
) -> Result<bool, RepositoryError> {
    let result = sqlx::query("DELETE FROM cart_items WHERE id = $1 AND cart_id = $2")
        .bind(item_id)
        .bind(cart_id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Close an active cart. Returns `false` if it was no longer active.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn mark_ordered(conn: &mut PgConnection, cart_id: CartId) -> Result<bool, RepositoryError> {
    let result = sqlx::query(
        r"
        UPDATE carts SET status = 'ordered', updated_at = NOW()
        WHERE id = $1 AND status = 'active'
        ",
    )
    .bind(cart_id)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() == 1)
}
