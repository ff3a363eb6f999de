//! Catalog route handlers.

use axum::{
    Json,
    extract::{Multipart, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use kedai_core::{Money, ProductId, ProductImageId};

use super::{ACK, Ack, ApiJson, ApiPath};
use crate::db::ProductRepository;
use crate::db::products::{NewProduct, ProductPatch};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::{Product, ProductDetail, ProductImage, ProductSummary};
use crate::state::AppState;

/// Multipart field carrying the image.
const FILE_FIELD: &str = "file";

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub active: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub ok: bool,
    pub images: Vec<ProductImage>,
}

fn parse_price(raw: i64) -> Result<Money> {
    Money::parse(raw).map_err(|e| AppError::Validation(format!("price: {e}")))
}

fn non_blank(name: &str) -> Result<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("name must not be empty".to_owned()));
    }
    Ok(name)
}

/// GET /api/products
///
/// `?active=true` limits the list to active products.
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<ProductSummary>>> {
    let active_only = query.active.as_deref() == Some("true");
    let products = ProductRepository::new(state.pool())
        .list(active_only)
        .await?;
    Ok(Json(products))
}

/// GET /api/products/{id}
pub async fn show(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ProductId>,
) -> Result<Json<ProductDetail>> {
    let repo = ProductRepository::new(state.pool());
    let product = repo.get(id).await?.ok_or(AppError::NotFound("not_found"))?;
    let images = repo.images(id).await?;
    Ok(Json(ProductDetail { product, images }))
}

/// POST /api/products
#[instrument(skip_all, fields(admin_id = %admin.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiJson(req): ApiJson<CreateProductRequest>,
) -> Result<(StatusCode, Json<Product>)> {
    let name = non_blank(req.name.as_deref().unwrap_or_default())?;
    let price = parse_price(
        req.price
            .ok_or_else(|| AppError::Validation("price is required".to_owned()))?,
    )?;

    let product = ProductRepository::new(state.pool())
        .create(&NewProduct {
            name,
            description: req.description.as_deref(),
            price,
            is_active: req.is_active.unwrap_or(true),
        })
        .await?;

    tracing::info!(product_id = %product.id, "Product created");
    Ok((StatusCode::CREATED, Json(product)))
}

/// PUT /api/products/{id}
#[instrument(skip_all, fields(admin_id = %admin.id, product_id = %id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiPath(id): ApiPath<ProductId>,
    ApiJson(req): ApiJson<UpdateProductRequest>,
) -> Result<Json<Product>> {
    let patch = ProductPatch {
        name: req.name.as_deref().map(non_blank).transpose()?,
        description: req.description.as_deref(),
        price: req.price.map(parse_price).transpose()?,
        is_active: req.is_active,
    };
    if patch.is_empty() {
        return Err(AppError::Validation("no fields to update".to_owned()));
    }

    let product = ProductRepository::new(state.pool())
        .update(id, &patch)
        .await?;
    Ok(Json(product))
}

/// DELETE /api/products/{id}
#[instrument(skip_all, fields(admin_id = %admin.id, product_id = %id))]
pub async fn destroy(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiPath(id): ApiPath<ProductId>,
) -> Result<Json<Ack>> {
    if !ProductRepository::new(state.pool()).delete(id).await? {
        return Err(AppError::NotFound("not_found"));
    }
    tracing::info!("Product deleted");
    Ok(Json(ACK))
}

/// GET /api/products/{id}/images
pub async fn images(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ProductId>,
) -> Result<Json<Vec<ProductImage>>> {
    let images = ProductRepository::new(state.pool()).images(id).await?;
    Ok(Json(images))
}

/// POST /api/products/{id}/images
///
/// Expects a multipart `file` field with an `image/*` content type.
#[instrument(skip_all, fields(admin_id = %admin.id, product_id = %id))]
pub async fn upload_image(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiPath(id): ApiPath<ProductId>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>)> {
    let repo = ProductRepository::new(state.pool());
    if repo.get(id).await?.is_none() {
        return Err(AppError::NotFound("not_found"));
    }

    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let is_image = field
            .content_type()
            .is_some_and(|ct| ct.starts_with("image/"));
        if !is_image {
            return Err(AppError::Validation("file must be an image".to_owned()));
        }
        let file_name = field.file_name().unwrap_or_default().to_owned();
        let bytes = field.bytes().await?;
        upload = Some((file_name, bytes));
        break;
    }
    let Some((file_name, bytes)) = upload.filter(|(_, bytes)| !bytes.is_empty()) else {
        return Err(AppError::Validation("file_required".to_owned()));
    };

    let url = state.images().save(id, &file_name, &bytes).await?;
    if let Err(e) = repo.add_image(id, &url).await {
        // Row insert failed; don't leave an orphaned file behind
        if let Err(remove_err) = state.images().remove(&url).await {
            tracing::warn!(error = %remove_err, url = %url, "Failed to remove orphaned upload");
        }
        return Err(e.into());
    }

    tracing::info!(url = %url, "Product image uploaded");
    let images = repo.images(id).await?;
    Ok((StatusCode::CREATED, Json(UploadResponse { ok: true, images })))
}

/// DELETE /api/products/{id}/images/{image_id}
///
/// The row is deleted first; removing the file is best effort.
#[instrument(skip_all, fields(admin_id = %admin.id, product_id = %id, image_id = %image_id))]
pub async fn delete_image(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiPath((id, image_id)): ApiPath<(ProductId, ProductImageId)>,
) -> Result<Json<Ack>> {
    let image = ProductRepository::new(state.pool())
        .delete_image(id, image_id)
        .await?
        .ok_or(AppError::NotFound("not_found"))?;

    if let Err(e) = state.images().remove(&image.image_url).await {
        tracing::warn!(error = %e, url = %image.image_url, "Failed to remove image file");
    }
    Ok(Json(ACK))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank("  Latte ").unwrap(), "Latte");
        assert!(non_blank("   ").is_err());
    }

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price(15_000).unwrap().amount(), 15_000);
        assert_eq!(parse_price(0).unwrap(), Money::ZERO);
        assert!(matches!(parse_price(-1), Err(AppError::Validation(_))));
    }
}
