//! XMPP notifications.
//!
//! Messages are delivered through the XMPP server's HTTP administration API
//! (ejabberd `mod_http_api`, `send_message` command) rather than a persistent
//! client connection, so there is no session to keep alive and no reconnect
//! logic. Delivery is fire-and-forget: no retries, no receipts.

mod client;
mod error;

pub use client::{MessageKind, XmppClient, XmppPublicConfig, XmppStatus};
pub use error::XmppError;
