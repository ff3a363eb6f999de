//! HTTP route handlers for the storefront API.
//!
//! # Route Structure
//!
//! ```text
//! GET    /api/health                         - Liveness
//! GET    /api/health/ready                   - Readiness (database)
//!
//! # Auth
//! POST   /api/auth/register                  - Create account (rate limited)
//! POST   /api/auth/login                     - Issue bearer token (rate limited)
//! POST   /api/auth/logout                    - Revoke bearer token
//! GET    /api/auth/me                        - Current user
//!
//! # Catalog
//! GET    /api/products                       - Product listing (?active=true)
//! POST   /api/products                       - Create product (admin)
//! GET    /api/products/{id}                  - Product with images
//! PUT    /api/products/{id}                  - Update product (admin)
//! DELETE /api/products/{id}                  - Delete product (admin)
//! GET    /api/products/{id}/images           - Image list
//! POST   /api/products/{id}/images           - Upload image (admin, multipart)
//! DELETE /api/products/{id}/images/{image}   - Delete image (admin)
//!
//! # Settings
//! GET    /api/settings/{key}                 - Read setting
//! PUT    /api/settings/{key}                 - Upsert setting (admin)
//!
//! # Cart (requires auth)
//! GET    /api/cart                           - Active cart
//! POST   /api/cart/items                     - Add item (merges by product)
//! PUT    /api/cart/items/{id}                - Update qty / note
//! DELETE /api/cart/items/{id}                - Remove item
//!
//! # Orders (requires auth)
//! POST   /api/orders                         - Place order from active cart
//! GET    /api/orders                         - Own orders
//! GET    /api/orders/all                     - All orders (admin)
//! GET    /api/orders/{id}                    - Order detail (owner or admin)
//!
//! # XMPP
//! GET    /api/xmpp/status                    - Notifier status
//! POST   /api/xmpp/send                      - Direct message (admin)
//! POST   /api/xmpp/room                      - Room message (admin)
//! ```

pub mod auth;
pub mod cart;
pub mod health;
pub mod orders;
pub mod products;
pub mod settings;
pub mod xmpp;

use axum::{
    Router,
    extract::{DefaultBodyLimit, FromRequest, FromRequestParts},
    routing::{get, post, put},
};

use crate::error::AppError;
use crate::middleware::auth_rate_limiter;
use crate::state::AppState;

/// JSON body extractor whose rejection is a `validation_error`.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Path extractor whose rejection is a `validation_error`.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);

/// JSON `{"ok": true}` acknowledgement.
#[derive(Debug, serde::Serialize)]
pub struct Ack {
    pub ok: bool,
}

pub(crate) const ACK: Ack = Ack { ok: true };

/// Create the auth routes router.
///
/// Credential endpoints get the strict rate limiter when `rate_limit` is set.
pub fn auth_routes(rate_limit: bool) -> Router<AppState> {
    let credentials = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));
    let credentials = if rate_limit {
        credentials.layer(auth_rate_limiter())
    } else {
        credentials
    };

    Router::new()
        .merge(credentials)
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
}

/// Create the product routes router.
pub fn product_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::create))
        .route(
            "/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::destroy),
        )
        .route(
            "/{id}/images",
            get(products::images)
                .post(products::upload_image)
                .layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route(
            "/{id}/images/{image_id}",
            axum::routing::delete(products::delete_image),
        )
}

/// Create the settings routes router.
pub fn settings_routes() -> Router<AppState> {
    Router::new().route("/{key}", get(settings::show).put(settings::update))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/items", post(cart::add_item))
        .route(
            "/items/{id}",
            put(cart::update_item).delete(cart::remove_item),
        )
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(orders::place).get(orders::index))
        .route("/all", get(orders::all))
        .route("/{id}", get(orders::show))
}

/// Create the XMPP routes router.
pub fn xmpp_routes() -> Router<AppState> {
    Router::new()
        .route("/status", get(xmpp::status))
        .route("/send", post(xmpp::send))
        .route("/room", post(xmpp::room))
}

/// Create all `/api` routes.
pub fn api_routes(max_upload_bytes: usize, rate_limit: bool) -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/auth", auth_routes(rate_limit))
        .nest("/products", product_routes(max_upload_bytes))
        .nest("/settings", settings_routes())
        .nest("/cart", cart_routes())
        .nest("/orders", order_routes())
        .nest("/xmpp", xmpp_routes())
}
