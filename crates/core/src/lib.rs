//! Kedai Core - domain types and checkout math.
//!
//! This crate provides the types shared by every Kedai Kopi component:
//! - `storefront` - JSON API (catalog, cart, orders, auth, settings)
//! - `cli` - Command-line tools for migrations, seeding and user management
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP clients. The arithmetic behind order placement lives in
//! [`checkout`] so it can be tested without a database.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, money, quantities, names and statuses
//! - [`checkout`] - Turning cart lines into an order draft with totals

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod checkout;
pub mod types;

pub use checkout::{
    CheckoutError, CheckoutLine, DraftItem, OrderDraft, OrderTotals, cart_subtotal, plan_order,
};
pub use types::*;
