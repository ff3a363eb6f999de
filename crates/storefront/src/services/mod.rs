//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `auth` - Registration, password login and bearer tokens
//! - `cart` - The caller's active cart and its lines
//! - `orders` - Order placement (cart to order, one transaction) and order queries
//! - `uploads` - Product image files on disk
//! - `xmpp` - Optional chat notifications through the XMPP server's HTTP API

pub mod auth;
pub mod cart;
pub mod orders;
pub mod uploads;
pub mod xmpp;
