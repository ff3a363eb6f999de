//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// A required field was absent or blank.
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("invalid username: {0}")]
    InvalidUsername(#[from] kedai_core::UsernameError),

    #[error("invalid email: {0}")]
    InvalidEmail(#[from] kedai_core::EmailError),

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    #[error("username already taken")]
    UsernameTaken,

    /// Admin role requested without an admin token (and admins already exist).
    #[error("admin role requires an admin")]
    AdminRoleForbidden,

    /// Unknown user, disabled account or wrong password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Missing, unknown or expired bearer token.
    #[error("invalid or expired token")]
    InvalidToken,

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("token lifetime out of range")]
    TokenTtl,

    #[error("password hashing error")]
    PasswordHash,
}
