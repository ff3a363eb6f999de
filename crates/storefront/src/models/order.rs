//! Order types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use kedai_core::{Money, OrderId, OrderStatus, ProductId, Quantity, UserId, Username};

/// Result of a successful placement.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PlacedOrder {
    pub id: OrderId,
    pub subtotal: Money,
    pub total: Money,
}

/// Entry in the caller's own order history.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderSummary {
    pub id: OrderId,
    pub status: OrderStatus,
    pub total: Money,
    pub created_at: DateTime<Utc>,
}

/// Entry in the admin order list.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct AdminOrderSummary {
    pub id: OrderId,
    pub user_id: UserId,
    pub username: Username,
    pub status: OrderStatus,
    pub total: Money,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub status: OrderStatus,
    pub subtotal: Money,
    pub discount: Money,
    pub tax: Money,
    pub shipping_fee: Money,
    pub total: Money,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub qty: Quantity,
    pub price: Money,
    pub subtotal: Money,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}
