//! XMPP notifier route handlers.

use axum::{Json, extract::State};
use serde::Deserialize;
use tracing::instrument;

use super::{ACK, Ack, ApiJson};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::services::xmpp::{XmppClient, XmppError, XmppStatus};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SendRequest {
    pub to: Option<String>,
    pub body: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RoomRequest {
    pub body: Option<String>,
}

fn client(state: &AppState) -> Result<&XmppClient> {
    state.xmpp().ok_or(AppError::Notification(XmppError::Disabled))
}

fn required(value: Option<String>, field: &str) -> Result<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::Validation(format!("{field} is required")))
}

/// GET /api/xmpp/status
pub async fn status(State(state): State<AppState>) -> Json<XmppStatus> {
    Json(state.xmpp().map_or_else(XmppStatus::disabled, XmppClient::status))
}

/// POST /api/xmpp/send
#[instrument(skip_all, fields(admin_id = %admin.id))]
pub async fn send(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiJson(req): ApiJson<SendRequest>,
) -> Result<Json<Ack>> {
    let to = required(req.to, "to")?;
    let body = required(req.body, "body")?;
    client(&state)?.send_message(&to, &body).await?;
    Ok(Json(ACK))
}

/// POST /api/xmpp/room
#[instrument(skip_all, fields(admin_id = %admin.id))]
pub async fn room(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiJson(req): ApiJson<RoomRequest>,
) -> Result<Json<Ack>> {
    let body = required(req.body, "body")?;
    client(&state)?.send_room_message(&body).await?;
    Ok(Json(ACK))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_required() {
        assert_eq!(required(Some("hi".into()), "body").unwrap(), "hi");
        assert!(required(Some("  ".into()), "body").is_err());
        assert!(required(None, "to").is_err());
    }

    #[test]
    fn test_disabled_status_shape() {
        let json = serde_json::to_value(XmppStatus::disabled()).unwrap();
        assert_eq!(json, serde_json::json!({"ready": false, "config": null}));
    }
}
