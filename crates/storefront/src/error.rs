//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.
//!
//! Responses are JSON: `{"error": "<code>"}` with an optional `message` for
//! client errors. Server errors never carry details.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::services::cart::CartError;
use crate::services::orders::OrderError;
use crate::services::uploads::UploadError;
use crate::services::xmpp::XmppError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    /// XMPP notification failed or is unavailable.
    #[error("Notification error: {0}")]
    Notification(#[from] XmppError),

    #[error("Upload error: {0}")]
    Upload(#[from] UploadError),

    /// Invalid client input.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Resource not found. Carries the error code sent to the client.
    #[error("Not found: {0}")]
    NotFound(&'static str),

    /// Missing or invalid bearer token.
    #[error("Unauthorized")]
    Unauthorized,

    /// Authenticated, but not allowed.
    #[error("Forbidden")]
    Forbidden,

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        Self::Validation(err.body_text())
    }
}

const SERVER_ERROR: (StatusCode, &str) = (StatusCode::INTERNAL_SERVER_ERROR, "server_error");

impl AppError {
    /// Status and stable error code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Database(err) => repository_status(err),
            Self::Auth(err) => match err {
                AuthError::MissingField(_)
                | AuthError::InvalidUsername(_)
                | AuthError::InvalidEmail(_)
                | AuthError::WeakPassword(_) => (StatusCode::BAD_REQUEST, "validation_error"),
                AuthError::UsernameTaken => (StatusCode::CONFLICT, "username_taken"),
                AuthError::AdminRoleForbidden => (StatusCode::FORBIDDEN, "forbidden"),
                AuthError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "invalid_credentials"),
                AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "unauthorized"),
                AuthError::Repository(err) => repository_status(err),
                AuthError::TokenTtl | AuthError::PasswordHash => SERVER_ERROR,
            },
            Self::Cart(err) => match err {
                CartError::ProductNotFound => (StatusCode::NOT_FOUND, "product_not_found"),
                CartError::ItemNotFound => (StatusCode::NOT_FOUND, "not_found"),
                CartError::NothingToUpdate
                | CartError::QuantityTooLarge
                | CartError::Amount(_) => (StatusCode::BAD_REQUEST, "validation_error"),
                CartError::Repository(err) => repository_status(err),
            },
            Self::Order(err) => match err {
                OrderError::EmptyCart => (StatusCode::BAD_REQUEST, "empty_cart"),
                OrderError::AmountOutOfRange => (StatusCode::BAD_REQUEST, "validation_error"),
                OrderError::NotFound => (StatusCode::NOT_FOUND, "not_found"),
                OrderError::Forbidden => (StatusCode::FORBIDDEN, "forbidden"),
                OrderError::Repository(err) => repository_status(err),
            },
            Self::Notification(err) => match err {
                XmppError::Disabled => (StatusCode::SERVICE_UNAVAILABLE, "xmpp_disabled"),
                XmppError::RoomNotConfigured => {
                    (StatusCode::SERVICE_UNAVAILABLE, "xmpp_room_not_configured")
                }
                XmppError::Request(_) | XmppError::Api { .. } => {
                    (StatusCode::BAD_GATEWAY, "notification_failed")
                }
            },
            Self::Upload(_) | Self::Internal(_) => SERVER_ERROR,
            Self::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            Self::NotFound(code) => (StatusCode::NOT_FOUND, *code),
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized"),
            Self::Forbidden => (StatusCode::FORBIDDEN, "forbidden"),
        }
    }

    /// Human-readable detail for client errors where it helps.
    fn client_message(&self) -> Option<String> {
        match self {
            Self::Validation(msg) => Some(msg.clone()),
            Self::Auth(
                err @ (AuthError::MissingField(_)
                | AuthError::InvalidUsername(_)
                | AuthError::InvalidEmail(_)
                | AuthError::WeakPassword(_)),
            ) => Some(err.to_string()),
            Self::Cart(
                err @ (CartError::NothingToUpdate
                | CartError::QuantityTooLarge
                | CartError::Amount(_)),
            ) => Some(err.to_string()),
            Self::Order(err @ OrderError::AmountOutOfRange) => Some(err.to_string()),
            _ => None,
        }
    }
}

const fn repository_status(err: &RepositoryError) -> (StatusCode, &'static str) {
    match err {
        RepositoryError::NotFound => (StatusCode::NOT_FOUND, "not_found"),
        RepositoryError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
        RepositoryError::Database(_) | RepositoryError::DataCorruption(_) => SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        // Capture server errors to Sentry
        if status == StatusCode::INTERNAL_SERVER_ERROR || status == StatusCode::BAD_GATEWAY {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let body = ErrorBody {
            error: code,
            message: self.client_message(),
        };
        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context for the authenticated caller.
pub fn set_sentry_user(user_id: &impl ToString, username: &str) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            username: Some(username.to_owned()),
            ..Default::default()
        }));
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    async fn body_of(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product_not_found");
        assert_eq!(err.to_string(), "Not found: product_not_found");

        let err = AppError::Validation("qty is required".to_string());
        assert_eq!(err.to_string(), "Validation error: qty is required");
    }

    #[tokio::test]
    async fn test_empty_cart_body() {
        let (status, body) = body_of(OrderError::EmptyCart.into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, serde_json::json!({"error": "empty_cart"}));
    }

    #[tokio::test]
    async fn test_server_errors_hide_details() {
        let (status, body) = body_of(AppError::Internal("disk on fire".to_string())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, serde_json::json!({"error": "server_error"}));

        let err = OrderError::Repository(RepositoryError::DataCorruption("bad row".into()));
        let (status, body) = body_of(err.into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, serde_json::json!({"error": "server_error"}));
    }

    #[tokio::test]
    async fn test_validation_carries_message() {
        let (status, body) = body_of(AppError::Validation("qty must be greater than zero".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "validation_error");
        assert_eq!(body["message"], "qty must be greater than zero");
    }

    #[tokio::test]
    async fn test_oversized_merge_is_a_validation_error() {
        let (status, body) = body_of(CartError::QuantityTooLarge.into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "validation_error");
        assert_eq!(body["message"], "qty must be at most 2147483647 per line");
    }

    #[tokio::test]
    async fn test_order_total_overflow_is_a_validation_error() {
        let (status, body) = body_of(OrderError::AmountOutOfRange.into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "validation_error");
        assert_eq!(body["message"], "order total is out of range");
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(get_status(AppError::Unauthorized), StatusCode::UNAUTHORIZED);
        assert_eq!(get_status(AppError::Forbidden), StatusCode::FORBIDDEN);
        assert_eq!(
            get_status(AuthError::InvalidCredentials.into()),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AuthError::UsernameTaken.into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(CartError::ProductNotFound.into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(get_status(OrderError::Forbidden.into()), StatusCode::FORBIDDEN);
        assert_eq!(
            get_status(XmppError::Disabled.into()),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            get_status(XmppError::Request("timeout".into()).into()),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            get_status(RepositoryError::Conflict("cart".into()).into()),
            StatusCode::CONFLICT
        );
    }
}
