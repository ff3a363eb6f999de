//! Order route handlers.

use axum::{Json, extract::State, http::StatusCode};
use tracing::instrument;

use kedai_core::OrderId;

use super::ApiPath;
use crate::error::Result;
use crate::middleware::{RequireAdmin, RequireAuth};
use crate::models::{AdminOrderSummary, OrderDetail, OrderSummary, PlacedOrder};
use crate::services::orders::OrderService;
use crate::state::AppState;

/// POST /api/orders
///
/// Places an order from the caller's active cart.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn place(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<(StatusCode, Json<PlacedOrder>)> {
    let placed = OrderService::new(state.pool()).place_order(user.id).await?;
    Ok((StatusCode::CREATED, Json(placed)))
}

/// GET /api/orders
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<OrderSummary>>> {
    let orders = OrderService::new(state.pool()).list_for(user.id).await?;
    Ok(Json(orders))
}

/// GET /api/orders/all
pub async fn all(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<AdminOrderSummary>>> {
    let orders = OrderService::new(state.pool()).list_all().await?;
    Ok(Json(orders))
}

/// GET /api/orders/{id}
#[instrument(skip_all, fields(user_id = %user.id, order_id = %id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiPath(id): ApiPath<OrderId>,
) -> Result<Json<OrderDetail>> {
    let detail = OrderService::new(state.pool()).detail_for(&user, id).await?;
    Ok(Json(detail))
}
