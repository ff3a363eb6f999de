//! Domain models for the storefront.
//!
//! Row types derive `sqlx::FromRow` and are read with runtime-checked queries;
//! the `*View`/`*Detail` types are response shapes assembled from them.

pub mod cart;
pub mod order;
pub mod product;
pub mod setting;
pub mod user;

pub use cart::{CartItemRow, CartLine, CartView};
pub use order::{AdminOrderSummary, Order, OrderDetail, OrderItem, OrderSummary, PlacedOrder};
pub use product::{Product, ProductDetail, ProductImage, ProductSummary};
pub use setting::Setting;
pub use user::{CurrentUser, User};
