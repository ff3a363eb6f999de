//! Authentication service.
//!
//! Provides username/password accounts and opaque bearer tokens.

mod error;
pub mod token;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use sqlx::PgPool;

use kedai_core::{Email, UserRole, Username};

use crate::config::StorefrontConfig;
use crate::db::users::NewUser;
use crate::db::{RepositoryError, TokenRepository, UserRepository};
use crate::models::{CurrentUser, User};

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Input for [`AuthService::register`], as received from the client.
#[derive(Debug, Default)]
pub struct Registration<'a> {
    pub username: &'a str,
    pub email: Option<&'a str>,
    pub password: &'a str,
    /// Only `"admin"` means anything; every other value registers a member.
    pub role: Option<&'a str>,
}

/// A freshly issued bearer token. The plaintext is only ever returned here.
#[derive(Debug, Serialize)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: CurrentUser,
}

/// Authentication service.
///
/// Handles user registration, login and bearer token verification.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
    tokens: TokenRepository<'a>,
    config: &'a StorefrontConfig,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, config: &'a StorefrontConfig) -> Self {
        Self {
            users: UserRepository::new(pool),
            tokens: TokenRepository::new(pool),
            config,
        }
    }

    /// Register a new account.
    ///
    /// The admin role is granted only while no admin exists yet, or when
    /// `actor` is an admin.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingField` if username or password is blank.
    /// Returns `AuthError::InvalidUsername` / `AuthError::InvalidEmail` on bad input.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::AdminRoleForbidden` for an unauthorized admin request.
    /// Returns `AuthError::UsernameTaken` if the username is already registered.
    pub async fn register(
        &self,
        input: &Registration<'_>,
        actor: Option<&CurrentUser>,
    ) -> Result<User, AuthError> {
        if input.username.trim().is_empty() {
            return Err(AuthError::MissingField("username"));
        }
        if input.password.is_empty() {
            return Err(AuthError::MissingField("password"));
        }

        let username = Username::parse(input.username)?;
        let email = match input.email.map(str::trim) {
            Some(raw) if !raw.is_empty() => Some(Email::parse(raw)?),
            _ => None,
        };
        validate_password(input.password)?;

        let role = if input.role == Some(UserRole::Admin.as_str()) {
            let allowed =
                actor.is_some_and(CurrentUser::is_admin) || !self.users.admin_exists().await?;
            if !allowed {
                return Err(AuthError::AdminRoleForbidden);
            }
            UserRole::Admin
        } else {
            UserRole::Member
        };

        let password_hash = hash_password(input.password)?;

        let user = self
            .users
            .create(&NewUser {
                username: &username,
                email: email.as_ref(),
                password_hash: &password_hash,
                role,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UsernameTaken,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(user_id = %user.id, username = %user.username, role = %user.role, "User registered");
        Ok(user)
    }

    /// Verify a password and issue a bearer token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` for an unknown user, a disabled
    /// account or a wrong password.
    pub async fn login(&self, username: &str, password: &str) -> Result<IssuedToken, AuthError> {
        // Malformed usernames cannot exist, so they are just bad credentials
        let Ok(username) = Username::parse(username) else {
            return Err(AuthError::InvalidCredentials);
        };

        let (user, password_hash) = self
            .users
            .get_with_password_hash(&username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        if user.status != kedai_core::UserStatus::Active {
            return Err(AuthError::InvalidCredentials);
        }

        self.tokens.purge_expired(user.id).await?;

        let token = token::generate();
        let ttl = TimeDelta::from_std(self.config.token_ttl).map_err(|_| AuthError::TokenTtl)?;
        let expires_at = Utc::now() + ttl;
        self.tokens
            .insert(
                user.id,
                &token::hash(&self.config.token_secret, &token),
                expires_at,
            )
            .await?;

        tracing::info!(user_id = %user.id, "User logged in");
        Ok(IssuedToken {
            token,
            expires_at,
            user: CurrentUser::from(&user),
        })
    }

    /// Resolve a presented bearer token to its owner.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` if the token is malformed, unknown,
    /// expired, or belongs to a disabled account.
    pub async fn authenticate(&self, token: &str) -> Result<CurrentUser, AuthError> {
        if !token::is_well_formed(token) {
            return Err(AuthError::InvalidToken);
        }
        self.tokens
            .find_user(&token::hash(&self.config.token_secret, token))
            .await?
            .ok_or(AuthError::InvalidToken)
    }

    /// Revoke a token. Revoking an unknown token is not an error.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the database operation fails.
    pub async fn logout(&self, token: &str) -> Result<(), AuthError> {
        if token::is_well_formed(token) {
            self.tokens
                .revoke(&token::hash(&self.config.token_secret, token))
                .await?;
        }
        Ok(())
    }
}

/// Validate password meets requirements.
///
/// # Errors
///
/// Returns `AuthError::WeakPassword` if the password is too short.
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a stored hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::PasswordHash)?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_password() {
        assert!(validate_password("admin123").is_ok());
        assert!(matches!(
            validate_password("short"),
            Err(AuthError::WeakPassword(_))
        ));
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("member123").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("member123", &hash).is_ok());
        assert!(matches!(
            verify_password("member124", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_hashes_are_salted() {
        assert_ne!(
            hash_password("same-password").unwrap(),
            hash_password("same-password").unwrap()
        );
    }

    #[test]
    fn test_garbage_hash_is_an_error() {
        assert!(matches!(
            verify_password("whatever", "not-a-phc-string"),
            Err(AuthError::PasswordHash)
        ));
    }
}
