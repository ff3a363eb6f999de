//! Site settings route handlers.
//!
//! Settings are free-form JSON values keyed by a short string.

use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use tracing::instrument;

use super::{ApiJson, ApiPath};
use crate::db::SettingsRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::Setting;
use crate::state::AppState;

const MAX_KEY_CHARS: usize = 128;

#[derive(Debug, Deserialize)]
pub struct UpdateSettingRequest {
    pub value: Option<JsonValue>,
}

fn validate_key(key: &str) -> Result<()> {
    let len = key.chars().count();
    if len == 0 || len > MAX_KEY_CHARS {
        return Err(AppError::Validation(format!(
            "key must be 1 to {MAX_KEY_CHARS} characters"
        )));
    }
    Ok(())
}

/// GET /api/settings/{key}
pub async fn show(
    State(state): State<AppState>,
    ApiPath(key): ApiPath<String>,
) -> Result<Json<Setting>> {
    validate_key(&key)?;
    let setting = SettingsRepository::new(state.pool())
        .get(&key)
        .await?
        .ok_or(AppError::NotFound("not_found"))?;
    Ok(Json(setting))
}

/// PUT /api/settings/{key}
#[instrument(skip_all, fields(admin_id = %admin.id, key = %key))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiPath(key): ApiPath<String>,
    ApiJson(req): ApiJson<UpdateSettingRequest>,
) -> Result<Json<Setting>> {
    validate_key(&key)?;
    let value = req
        .value
        .ok_or_else(|| AppError::Validation("value is required".to_owned()))?;

    let setting = SettingsRepository::new(state.pool())
        .upsert(&key, &value)
        .await?;
    tracing::info!("Setting updated");
    Ok(Json(setting))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_key() {
        assert!(validate_key("store_hours").is_ok());
        assert!(validate_key(&"k".repeat(MAX_KEY_CHARS)).is_ok());
        assert!(validate_key(&"k".repeat(MAX_KEY_CHARS + 1)).is_err());
        assert!(validate_key("").is_err());
    }
}
