//! XMPP-related errors.

use thiserror::Error;

/// Errors that can occur when sending XMPP notifications.
#[derive(Debug, Error)]
pub enum XmppError {
    /// No XMPP API configured.
    #[error("XMPP notifications are disabled")]
    Disabled,

    /// Groupchat requested without `XMPP_ROOM_JID`.
    #[error("XMPP room is not configured")]
    RoomNotConfigured,

    /// HTTP request failed.
    #[error("XMPP request failed: {0}")]
    Request(String),

    /// The server answered with a non-success status.
    #[error("XMPP API error ({status}): {body}")]
    Api { status: u16, body: String },
}
