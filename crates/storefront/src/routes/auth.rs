//! Account and token route handlers.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use tracing::instrument;

use super::ApiJson;
use crate::error::{AppError, Result};
use crate::middleware::{BearerToken, OptionalAuth, RequireAuth};
use crate::models::CurrentUser;
use crate::services::auth::{AuthService, IssuedToken, Registration};
use crate::state::AppState;

/// Registration request body.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// POST /api/auth/register
///
/// An admin bearer token, if presented, allows creating further admins.
#[instrument(skip(state, actor, req))]
pub async fn register(
    State(state): State<AppState>,
    OptionalAuth(actor): OptionalAuth,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<CurrentUser>)> {
    let registration = Registration {
        username: req.username.as_deref().unwrap_or_default(),
        email: req.email.as_deref(),
        password: req.password.as_deref().unwrap_or_default(),
        role: req.role.as_deref(),
    };

    let user = AuthService::new(state.pool(), state.config())
        .register(&registration, actor.as_ref())
        .await?;

    Ok((StatusCode::CREATED, Json(CurrentUser::from(&user))))
}

/// POST /api/auth/login
#[instrument(skip(state, req))]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<IssuedToken>> {
    let (Some(username), Some(password)) = (req.username, req.password) else {
        return Err(AppError::Validation(
            "username and password are required".to_owned(),
        ));
    };

    let issued = AuthService::new(state.pool(), state.config())
        .login(&username, &password)
        .await?;

    Ok(Json(issued))
}

/// POST /api/auth/logout
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn logout(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    BearerToken(token): BearerToken,
) -> Result<StatusCode> {
    AuthService::new(state.pool(), state.config())
        .logout(&token)
        .await?;
    tracing::info!("User logged out");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/auth/me
pub async fn me(RequireAuth(user): RequireAuth) -> Json<CurrentUser> {
    Json(user)
}
