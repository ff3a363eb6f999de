//! Opaque bearer tokens.
//!
//! A token is 32 random bytes, base64url encoded without padding. The database
//! only ever sees `hex(HMAC-SHA256(token_secret, token))`, so a leaked table
//! cannot be replayed without the server secret.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::{Hmac, Mac};
use rand::RngCore;
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;

const TOKEN_BYTES: usize = 32;

/// Generate a new random token.
#[must_use]
pub fn generate() -> String {
    let mut bytes = [0_u8; TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Hash a presented token for storage or lookup.
#[must_use]
pub fn hash(secret: &SecretString, token: &str) -> String {
    // HMAC accepts keys of any length, so construction cannot fail
    let mut mac = <Hmac<Sha256> as Mac>::new_from_slice(secret.expose_secret().as_bytes())
        .unwrap_or_else(|_| unreachable!("HMAC accepts any key length"));
    mac.update(token.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Cheap shape check before touching the database.
#[must_use]
pub fn is_well_formed(token: &str) -> bool {
    token.len() == 43
        && token
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}
