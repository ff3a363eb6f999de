//! Cart types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use kedai_core::{CartId, CartItemId, CheckoutError, Money, ProductId, Quantity, cart_subtotal};

/// A cart line joined with its product name, as read from storage.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CartItemRow {
    pub id: CartItemId,
    pub product_id: ProductId,
    pub name: String,
    pub qty: Quantity,
    pub price_at: Money,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CartLine {
    pub id: CartItemId,
    pub product_id: ProductId,
    pub name: String,
    pub qty: Quantity,
    /// Unit price captured when the product was first added.
    pub price_at: Money,
    pub note: Option<String>,
    pub subtotal: Money,
}

/// The caller's active cart.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub id: CartId,
    pub items: Vec<CartLine>,
    pub subtotal: Money,
}

impl CartView {
    /// Assemble the view, computing line and cart subtotals.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::AmountOutOfRange`] if a subtotal overflows.
    pub fn build(id: CartId, rows: Vec<CartItemRow>) -> Result<Self, CheckoutError> {
        let subtotal = cart_subtotal(rows.iter().map(|r| (r.qty, r.price_at)))?;
        let items = rows
            .into_iter()
            .map(|r| {
                Ok(CartLine {
                    subtotal: r.price_at.times(r.qty.get())?,
                    id: r.id,
                    product_id: r.product_id,
                    name: r.name,
                    qty: r.qty,
                    price_at: r.price_at,
                    note: r.note,
                })
            })
            .collect::<Result<Vec<_>, CheckoutError>>()?;

        Ok(Self {
            id,
            items,
            subtotal,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn row(name: &str, qty: i64, price: i64) -> CartItemRow {
        CartItemRow {
            id: CartItemId::new_v4(),
            product_id: ProductId::new_v4(),
            name: name.to_owned(),
            qty: Quantity::parse(qty).unwrap(),
            price_at: Money::parse(price).unwrap(),
            note: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_build_computes_subtotals() {
        let view = CartView::build(
            CartId::new_v4(),
            vec![row("Espresso", 2, 15_000), row("Latte", 1, 20_000)],
        )
        .unwrap();

        assert_eq!(view.subtotal.amount(), 50_000);
        assert_eq!(view.items.len(), 2);
        assert_eq!(view.items[0].subtotal.amount(), 30_000);
        assert_eq!(view.items[1].subtotal.amount(), 20_000);
    }

    #[test]
    fn test_empty_cart_view() {
        let view = CartView::build(CartId::new_v4(), Vec::new()).unwrap();
        assert!(view.items.is_empty());
        assert_eq!(view.subtotal, Money::ZERO);
    }

    #[test]
    fn test_serialized_shape() {
        let view = CartView::build(CartId::new_v4(), vec![row("Latte", 3, 20_000)]).unwrap();
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["subtotal"], 60_000);
        assert_eq!(json["items"][0]["name"], "Latte");
        assert_eq!(json["items"][0]["qty"], 3);
        assert_eq!(json["items"][0]["price_at"], 20_000);
        assert!(json["items"][0]["note"].is_null());
    }
}
