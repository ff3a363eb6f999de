//! Product and product image repository.

use sqlx::PgPool;

use kedai_core::{Money, ProductId, ProductImageId};

use super::RepositoryError;
use crate::models::{Product, ProductImage, ProductSummary};

const PRODUCT_COLUMNS: &str = "id, name, description, price, is_active, created_at, updated_at";
const IMAGE_COLUMNS: &str = "id, product_id, image_url, width, height, sort_order, created_at";

#[derive(Debug)]
pub struct NewProduct<'a> {
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub price: Money,
    pub is_active: bool,
}

/// Partial update. `None` leaves the column untouched.
#[derive(Debug, Default)]
pub struct ProductPatch<'a> {
    pub name: Option<&'a str>,
    pub description: Option<&'a str>,
    pub price: Option<Money>,
    pub is_active: Option<bool>,
}

impl ProductPatch<'_> {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.is_active.is_none()
    }
}

pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Newest first, each with its first image.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, active_only: bool) -> Result<Vec<ProductSummary>, RepositoryError> {
        let products = sqlx::query_as::<_, ProductSummary>(
            r"
            SELECT p.id, p.name, p.price, p.is_active, p.created_at,
                   (SELECT i.image_url FROM product_images i
                    WHERE i.product_id = p.id
                    ORDER BY i.sort_order, i.created_at, i.id
                    LIMIT 1) AS image_url
            FROM products p
            WHERE ($1 = FALSE OR p.is_active)
            ORDER BY p.created_at DESC, p.id
            ",
        )
        .bind(active_only)
        .fetch_all(self.pool)
        .await?;
        Ok(products)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(product)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, new: &NewProduct<'_>) -> Result<Product, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            r"
            INSERT INTO products (id, name, description, price, is_active)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(ProductId::new_v4())
        .bind(new.name)
        .bind(new.description)
        .bind(new.price)
        .bind(new.is_active)
        .fetch_one(self.pool)
        .await?;
        Ok(product)
    }

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    pub async fn update(
        &self,
        id: ProductId,
        patch: &ProductPatch<'_>,
    ) -> Result<Product, RepositoryError> {
        sqlx::query_as::<_, Product>(&format!(
            r"
            UPDATE products SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                price = COALESCE($4, price),
                is_active = COALESCE($5, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(id)
        .bind(patch.name)
        .bind(patch.description)
        .bind(patch.price)
        .bind(patch.is_active)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Returns `true` if a row was deleted. Cart lines go with it; order
    /// items keep their snapshot.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn images(&self, product_id: ProductId) -> Result<Vec<ProductImage>, RepositoryError> {
        let images = sqlx::query_as::<_, ProductImage>(&format!(
            r"
            SELECT {IMAGE_COLUMNS} FROM product_images
            WHERE product_id = $1
            ORDER BY sort_order, created_at, id
            "
        ))
        .bind(product_id)
        .fetch_all(self.pool)
        .await?;
        Ok(images)
    }

    /// Append an image after the existing ones.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn add_image(
        &self,
        product_id: ProductId,
        image_url: &str,
    ) -> Result<ProductImage, RepositoryError> {
        let image = sqlx::query_as::<_, ProductImage>(&format!(
            r"
            INSERT INTO product_images (id, product_id, image_url, sort_order)
            VALUES ($1, $2, $3,
                    (SELECT COALESCE(MAX(sort_order) + 1, 0)
                     FROM product_images WHERE product_id = $2))
            RETURNING {IMAGE_COLUMNS}
            "
        ))
        .bind(ProductImageId::new_v4())
        .bind(product_id)
        .bind(image_url)
        .fetch_one(self.pool)
        .await?;
        Ok(image)
    }

    /// Delete one image of a product, returning the deleted row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete_image(
        &self,
        product_id: ProductId,
        image_id: ProductImageId,
    ) -> Result<Option<ProductImage>, RepositoryError> {
        let image = sqlx::query_as::<_, ProductImage>(&format!(
            "DELETE FROM product_images WHERE id = $1 AND product_id = $2 RETURNING {IMAGE_COLUMNS}"
        ))
        .bind(image_id)
        .bind(product_id)
        .fetch_optional(self.pool)
        .await?;
        Ok(image)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(self.pool)
            .await?;
        Ok(n)
    }
}
