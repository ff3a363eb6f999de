//! Demo data.
//!
//! Seeding is idempotent per table: users are only created when the users
//! table is empty, products only when the products table is empty.

use sqlx::PgPool;
use tracing::info;

use kedai_core::{Email, Money, UserRole, Username};
use kedai_storefront::db::products::NewProduct;
use kedai_storefront::db::users::NewUser;
use kedai_storefront::db::{ProductRepository, UserRepository};
use kedai_storefront::services::auth::hash_password;

use super::{CommandError, connect};

/// Placeholder image shipped with the frontend.
const DEMO_IMAGE: &str = "img/menu/1.jpg";

const DEMO_USERS: [(&str, &str, &str, UserRole); 2] = [
    ("admin", "admin@example.com", "admin123", UserRole::Admin),
    ("member", "member@example.com", "member123", UserRole::Member),
];

const DEMO_PRODUCTS: [(&str, &str, i64); 3] = [
    ("Espresso", "Shot kopi pekat dengan crema.", 15_000),
    ("Cappuccino", "Perpaduan espresso, susu, dan foam.", 25_000),
    ("Latte", "Espresso dengan susu steamed yang lembut.", 20_000),
];

/// What a seed run created.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub users_created: usize,
    pub products_created: usize,
}

/// Seed demo users and products into an existing pool.
///
/// # Errors
///
/// Returns an error if a database operation fails.
pub async fn demo_on(pool: &PgPool) -> Result<SeedSummary, CommandError> {
    let mut summary = SeedSummary::default();

    let users = UserRepository::new(pool);
    if users.count().await? == 0 {
        for (username, email, password, role) in DEMO_USERS {
            let username =
                Username::parse(username).map_err(|e| CommandError::InvalidInput(e.to_string()))?;
            let email = Email::parse(email).map_err(|e| CommandError::InvalidInput(e.to_string()))?;
            let password_hash = hash_password(password)?;
            users
                .create(&NewUser {
                    username: &username,
                    email: Some(&email),
                    password_hash: &password_hash,
                    role,
                })
                .await?;
            summary.users_created += 1;
        }
    } else {
        info!("Users already exist, skipping demo users");
    }

    let products = ProductRepository::new(pool);
    if products.count().await? == 0 {
        for (name, description, price) in DEMO_PRODUCTS {
            let product = products
                .create(&NewProduct {
                    name,
                    description: Some(description),
                    price: Money::parse(price)
                        .map_err(|e| CommandError::InvalidInput(e.to_string()))?,
                    is_active: true,
                })
                .await?;
            products.add_image(product.id, DEMO_IMAGE).await?;
            summary.products_created += 1;
        }
    } else {
        info!("Products already exist, skipping demo products");
    }

    Ok(summary)
}

/// Seed demo data.
///
/// # Errors
///
/// Returns an error if the database is unreachable or an insert fails.
pub async fn demo() -> Result<(), CommandError> {
    let pool = connect().await?;
    let summary = demo_on(&pool).await?;
    info!(
        users_created = summary.users_created,
        products_created = summary.products_created,
        "Seeding complete"
    );
    Ok(())
}
