//! Order placement math.
//!
//! [`plan_order`] is the pure half of placing an order: it takes the lines of
//! an active cart (with the unit price captured when each product was added)
//! and produces the rows to write, with every amount already computed. The
//! storefront runs it inside the placement transaction, between reading the
//! cart and inserting the order.
//!
//! Totals follow `total = subtotal - discount + tax + shipping_fee`. Discount,
//! tax and shipping are always zero today, so `total == subtotal`; the fields
//! exist so the stored order already has the final shape.

use serde::Serialize;

use crate::types::{Money, MoneyError, ProductId, Quantity};

/// Reasons an order cannot be planned.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutError {
    /// No active cart, or an active cart with no lines.
    #[error("cart is empty")]
    EmptyCart,
    /// A line or the order total overflowed.
    #[error("order total is out of range")]
    AmountOutOfRange,
}

impl From<MoneyError> for CheckoutError {
    fn from(_: MoneyError) -> Self {
        Self::AmountOutOfRange
    }
}

/// One cart line as read from storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutLine {
    pub product_id: ProductId,
    /// Current product name, snapshotted onto the order item.
    pub product_name: String,
    pub qty: Quantity,
    /// Unit price captured when the product was first added to the cart.
    pub price_at: Money,
}

/// One order item to insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DraftItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub qty: Quantity,
    pub price: Money,
    /// `qty * price`.
    pub subtotal: Money,
}

/// Order-level amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct OrderTotals {
    pub subtotal: Money,
    pub discount: Money,
    pub tax: Money,
    pub shipping_fee: Money,
    pub total: Money,
}

impl OrderTotals {
    /// Totals for a subtotal with no adjustments.
    ///
    /// # Errors
    ///
    /// Propagates [`MoneyError`] from the adjustment arithmetic.
    pub fn from_subtotal(subtotal: Money) -> Result<Self, MoneyError> {
        let discount = Money::ZERO;
        let tax = Money::ZERO;
        let shipping_fee = Money::ZERO;
        let total = subtotal
            .checked_sub(discount)?
            .checked_add(tax)?
            .checked_add(shipping_fee)?;
        Ok(Self {
            subtotal,
            discount,
            tax,
            shipping_fee,
            total,
        })
    }
}

/// Everything needed to write an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderDraft {
    pub items: Vec<DraftItem>,
    pub totals: OrderTotals,
}

/// Compute order items and totals from cart lines.
///
/// Lines keep their input order. The sum of item subtotals always equals
/// `totals.subtotal`.
///
/// # Errors
///
/// - [`CheckoutError::EmptyCart`] if `lines` is empty
/// - [`CheckoutError::AmountOutOfRange`] if any amount overflows
pub fn plan_order(lines: &[CheckoutLine]) -> Result<OrderDraft, CheckoutError> {
    if lines.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    let mut subtotal = Money::ZERO;
    let mut items = Vec::with_capacity(lines.len());
    for line in lines {
        let line_total = line.price_at.times(line.qty.get())?;
        subtotal = subtotal.checked_add(line_total)?;
        items.push(DraftItem {
            product_id: line.product_id,
            product_name: line.product_name.clone(),
            qty: line.qty,
            price: line.price_at,
            subtotal: line_total,
        });
    }

    Ok(OrderDraft {
        items,
        totals: OrderTotals::from_subtotal(subtotal)?,
    })
}

/// Subtotal of a set of cart lines, for cart views.
///
/// # Errors
///
/// Returns [`CheckoutError::AmountOutOfRange`] on overflow. An empty slice is
/// fine and yields zero.
pub fn cart_subtotal<I>(lines: I) -> Result<Money, CheckoutError>
where
    I: IntoIterator<Item = (Quantity, Money)>,
{
    lines.into_iter().try_fold(Money::ZERO, |acc, (qty, price)| {
        Ok(acc.checked_add(price.times(qty.get())?)?)
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn line(name: &str, qty: i64, price: i64) -> CheckoutLine {
        CheckoutLine {
            product_id: ProductId::new_v4(),
            product_name: name.to_owned(),
            qty: Quantity::parse(qty).unwrap(),
            price_at: Money::parse(price).unwrap(),
        }
    }

    #[test]
    fn test_espresso_and_latte() {
        let draft = plan_order(&[line("Espresso", 2, 15_000), line("Latte", 1, 20_000)]).unwrap();

        assert_eq!(draft.totals.subtotal.amount(), 50_000);
        assert_eq!(draft.totals.total.amount(), 50_000);
        assert_eq!(draft.totals.discount, Money::ZERO);
        assert_eq!(draft.totals.tax, Money::ZERO);
        assert_eq!(draft.totals.shipping_fee, Money::ZERO);

        let subtotals: Vec<i64> = draft.items.iter().map(|i| i.subtotal.amount()).collect();
        assert_eq!(subtotals, vec![30_000, 20_000]);
        assert_eq!(draft.items[0].product_name, "Espresso");
        assert_eq!(draft.items[0].price.amount(), 15_000);
    }

    #[test]
    fn test_empty_cart_is_rejected() {
        assert_eq!(plan_order(&[]), Err(CheckoutError::EmptyCart));
    }

    #[test]
    fn test_item_subtotals_sum_to_order_subtotal() {
        let lines = [
            line("Espresso", 3, 15_000),
            line("Cappuccino", 7, 25_000),
            line("Latte", 1, 20_000),
            line("Air Mineral", 12, 0),
        ];
        let draft = plan_order(&lines).unwrap();

        let mut sum = Money::ZERO;
        for item in &draft.items {
            assert_eq!(item.subtotal, item.price.times(item.qty.get()).unwrap());
            sum = sum.checked_add(item.subtotal).unwrap();
        }
        assert_eq!(sum, draft.totals.subtotal);
        assert_eq!(draft.totals.total, draft.totals.subtotal);
    }

    #[test]
    fn test_overflow_is_reported() {
        let lines = [line("Gold", 2, i64::MAX / 2), line("Foil", 1, 10)];
        assert_eq!(plan_order(&lines), Err(CheckoutError::AmountOutOfRange));
    }

    #[test]
    fn test_cart_subtotal() {
        let q = |n| Quantity::parse(n).unwrap();
        let m = |n| Money::parse(n).unwrap();
        assert_eq!(cart_subtotal([]).unwrap(), Money::ZERO);
        assert_eq!(
            cart_subtotal([(q(2), m(15_000)), (q(1), m(20_000))]).unwrap(),
            m(50_000)
        );
    }
}
