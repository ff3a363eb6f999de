//! Cart route handlers.
//!
//! All handlers act on the caller's active cart, which is created on demand.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use tracing::instrument;

use kedai_core::{CartItemId, ProductId, Quantity};

use super::{ApiJson, ApiPath};
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::CartView;
use crate::services::cart::CartService;
use crate::state::AppState;

/// Add-item request body.
#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product_id: Option<ProductId>,
    pub qty: Option<i64>,
}

/// Update-item request body. At least one field is required.
#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub qty: Option<i64>,
    pub note: Option<String>,
}

fn parse_qty(raw: i64) -> Result<Quantity> {
    Quantity::parse(raw).map_err(|e| AppError::Validation(e.to_string()))
}

/// GET /api/cart
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<CartView>> {
    let cart = CartService::new(state.pool()).view(user.id).await?;
    Ok(Json(cart))
}

/// POST /api/cart/items
///
/// Input is validated before anything is written.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn add_item(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiJson(req): ApiJson<AddItemRequest>,
) -> Result<(StatusCode, Json<CartView>)> {
    let product_id = req
        .product_id
        .ok_or_else(|| AppError::Validation("product_id is required".to_owned()))?;
    let qty = parse_qty(
        req.qty
            .ok_or_else(|| AppError::Validation("qty is required".to_owned()))?,
    )?;

    let cart = CartService::new(state.pool())
        .add_item(user.id, product_id, qty)
        .await?;
    Ok((StatusCode::CREATED, Json(cart)))
}

/// PUT /api/cart/items/{id}
#[instrument(skip_all, fields(user_id = %user.id, item_id = %item_id))]
pub async fn update_item(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiPath(item_id): ApiPath<CartItemId>,
    ApiJson(req): ApiJson<UpdateItemRequest>,
) -> Result<Json<CartView>> {
    let qty = req.qty.map(parse_qty).transpose()?;

    let cart = CartService::new(state.pool())
        .update_item(user.id, item_id, qty, req.note.as_deref())
        .await?;
    Ok(Json(cart))
}

/// DELETE /api/cart/items/{id}
#[instrument(skip_all, fields(user_id = %user.id, item_id = %item_id))]
pub async fn remove_item(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiPath(item_id): ApiPath<CartItemId>,
) -> Result<Json<CartView>> {
    let cart = CartService::new(state.pool())
        .remove_item(user.id, item_id)
        .await?;
    Ok(Json(cart))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_qty() {
        assert_eq!(parse_qty(3).unwrap().get(), 3);
        assert!(matches!(parse_qty(0), Err(AppError::Validation(_))));
        assert!(matches!(parse_qty(-2), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_add_item_body_accepts_missing_fields() {
        let req: AddItemRequest = serde_json::from_str("{}").unwrap();
        assert!(req.product_id.is_none());
        assert!(req.qty.is_none());
    }
}
