//! HTTP API client for the XMPP server.

use reqwest::Client;
use secrecy::ExposeSecret;
use serde::Serialize;
use tracing::{debug, error, instrument};

use super::error::XmppError;
use crate::config::XmppConfig;

/// Message stanza type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    /// One-to-one message.
    Chat,
    /// Message to a multi-user chat room.
    Groupchat,
}

/// Body of the `send_message` command.
#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    #[serde(rename = "type")]
    kind: MessageKind,
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    body: &'a str,
}

/// Public view of the notifier, without the password.
#[derive(Debug, Clone, Serialize)]
pub struct XmppStatus {
    pub ready: bool,
    /// `None` when notifications are not configured.
    pub config: Option<XmppPublicConfig>,
}

impl XmppStatus {
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            ready: false,
            config: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct XmppPublicConfig {
    pub api_url: String,
    pub jid: String,
    pub resource: String,
    pub room_jid: Option<String>,
    pub room_nick: String,
}

/// XMPP API client for sending chat and room messages.
#[derive(Clone)]
pub struct XmppClient {
    client: Client,
    config: XmppConfig,
    /// `jid/resource`, the sender address of every message.
    from: String,
}

impl std::fmt::Debug for XmppClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XmppClient")
            .field("config", &self.config)
            .field("from", &self.from)
            .finish_non_exhaustive()
    }
}

impl XmppClient {
    /// Create a new XMPP client.
    #[must_use]
    pub fn new(config: XmppConfig) -> Self {
        let from = format!("{}/{}", config.jid, config.resource);
        Self {
            client: Client::new(),
            config,
            from,
        }
    }

    /// Status for the `/xmpp/status` endpoint.
    #[must_use]
    pub fn status(&self) -> XmppStatus {
        XmppStatus {
            ready: true,
            config: Some(XmppPublicConfig {
                api_url: self.config.api_url.to_string(),
                jid: self.config.jid.clone(),
                resource: self.config.resource.clone(),
                room_jid: self.config.room_jid.clone(),
                room_nick: self.config.room_nick.clone(),
            }),
        }
    }

    /// Send a one-to-one chat message.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the server rejects it.
    #[instrument(skip(self, body), fields(to = %to))]
    pub async fn send_message(&self, to: &str, body: &str) -> Result<(), XmppError> {
        self.send(MessageKind::Chat, to, body).await
    }

    /// Send a groupchat message to the configured room.
    ///
    /// # Errors
    ///
    /// Returns `XmppError::RoomNotConfigured` if no room is set, otherwise
    /// error if the request fails or the server rejects it.
    #[instrument(skip(self, body))]
    pub async fn send_room_message(&self, body: &str) -> Result<(), XmppError> {
        let room = self
            .config
            .room_jid
            .as_deref()
            .ok_or(XmppError::RoomNotConfigured)?;
        self.send(MessageKind::Groupchat, room, body).await
    }

    async fn send(&self, kind: MessageKind, to: &str, body: &str) -> Result<(), XmppError> {
        let message = SendMessage {
            kind,
            from: &self.from,
            to,
            subject: "",
            body,
        };

        let response = self
            .client
            .post(self.endpoint("send_message"))
            .basic_auth(&self.config.jid, Some(self.config.password.expose_secret()))
            .json(&message)
            .send()
            .await
            .map_err(|e| XmppError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), body = %body, "XMPP API error sending message");
            return Err(XmppError::Api {
                status: status.as_u16(),
                body,
            });
        }

        debug!(kind = ?kind, "Message sent via XMPP");
        Ok(())
    }

    fn endpoint(&self, command: &str) -> String {
        format!("{}/{command}", self.config.api_url.as_str().trim_end_matches('/'))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;
    use url::Url;

    use super::*;

    fn config(room: Option<&str>) -> XmppConfig {
        XmppConfig {
            api_url: Url::parse("https://xmpp.example.net:5443/api/").unwrap(),
            jid: "kedai@xmpp.example.net".to_owned(),
            password: SecretString::from("hunter22"),
            resource: "kedai-api".to_owned(),
            room_jid: room.map(str::to_owned),
            room_nick: "backend".to_owned(),
        }
    }

    #[test]
    fn test_endpoint_joins_without_double_slash() {
        let client = XmppClient::new(config(None));
        assert_eq!(
            client.endpoint("send_message"),
            "https://xmpp.example.net:5443/api/send_message"
        );
    }

    #[test]
    fn test_message_body_shape() {
        let json = serde_json::to_value(SendMessage {
            kind: MessageKind::Groupchat,
            from: "kedai@xmpp.example.net/kedai-api",
            to: "orders@muc.xmpp.example.net",
            subject: "",
            body: "Pesanan baru",
        })
        .unwrap();
        assert_eq!(json["type"], "groupchat");
        assert_eq!(json["from"], "kedai@xmpp.example.net/kedai-api");
        assert_eq!(json["body"], "Pesanan baru");
    }

    #[test]
    fn test_status_and_debug_hide_password() {
        let client = XmppClient::new(config(Some("orders@muc.xmpp.example.net")));
        let status = serde_json::to_string(&client.status()).unwrap();
        assert!(!status.contains("hunter22"));
        assert!(status.contains("orders@muc.xmpp.example.net"));
        assert!(!format!("{client:?}").contains("hunter22"));
    }

    #[tokio::test]
    async fn test_room_message_requires_room() {
        let client = XmppClient::new(config(None));
        assert!(matches!(
            client.send_room_message("hello").await,
            Err(XmppError::RoomNotConfigured)
        ));
    }
}
