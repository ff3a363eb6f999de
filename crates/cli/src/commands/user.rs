//! User management commands.
//!
//! ```bash
//! # Promote an existing account to admin
//! kedai-cli user promote barista
//!
//! # Create an account directly
//! kedai-cli user create -u barista -p 'correct horse' -e barista@kedai.test -r admin
//! ```

use kedai_core::{Email, UserRole, Username};
use kedai_storefront::db::users::NewUser;
use kedai_storefront::db::{RepositoryError, UserRepository};
use kedai_storefront::services::auth::{hash_password, validate_password};

use super::{CommandError, connect};

fn parse_username(raw: &str) -> Result<Username, CommandError> {
    Username::parse(raw).map_err(|e| CommandError::InvalidInput(e.to_string()))
}

/// Give an existing user the admin role.
///
/// # Errors
///
/// Returns `CommandError::UserNotFound` if no such user exists.
pub async fn promote(username: &str) -> Result<(), CommandError> {
    let username = parse_username(username)?;
    let pool = connect().await?;

    let user = UserRepository::new(&pool)
        .set_role(&username, UserRole::Admin)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => CommandError::UserNotFound(username.to_string()),
            other => CommandError::Repository(other),
        })?;

    tracing::info!(user_id = %user.id, username = %user.username, "User promoted to admin");
    Ok(())
}

/// Create a user with a password.
///
/// # Errors
///
/// Returns an error for invalid input, a taken username, or a database failure.
pub async fn create(
    username: &str,
    password: &str,
    email: Option<&str>,
    role: &str,
) -> Result<(), CommandError> {
    let username = parse_username(username)?;
    let email = email
        .map(Email::parse)
        .transpose()
        .map_err(|e| CommandError::InvalidInput(e.to_string()))?;
    let role: UserRole = role
        .parse()
        .map_err(|_| CommandError::InvalidRole(role.to_owned()))?;
    validate_password(password)?;
    let password_hash = hash_password(password)?;

    let pool = connect().await?;

    tracing::info!("Creating user: {} ({})", username, role);
    let user = UserRepository::new(&pool)
        .create(&NewUser {
            username: &username,
            email: email.as_ref(),
            password_hash: &password_hash,
            role,
        })
        .await?;

    tracing::info!(
        "User created successfully! ID: {}, Username: {}, Role: {}",
        user.id,
        user.username,
        user.role
    );
    Ok(())
}
