//! HMAC-SHA256 webhook signatures (`X-Viber-Content-Signature`).

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Length of the hex signature Viber sends (32-byte digest).
const SIGNATURE_HEX_LEN: usize = 64;

fn mac_for(token: &str, body: &[u8]) -> Option<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(token.as_bytes()).ok()?;
    mac.update(body);
    Some(mac)
}

/// Lowercase hex HMAC-SHA256 of `body` keyed by the auth token.
pub fn sign(body: &[u8], token: &str) -> String {
    mac_for(token, body)
        .map(|mac| hex::encode(mac.finalize().into_bytes()))
        .unwrap_or_default()
}

/// Check a signature header against the raw body, byte for byte and in constant time.
///
/// Only the exact form Viber sends is accepted: 64 lowercase hex characters, nothing around them.
pub fn verify(body: &[u8], signature: &str, token: &str) -> bool {
    let well_formed = signature.len() == SIGNATURE_HEX_LEN
        && signature
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
    if !well_formed {
        return false;
    }
    let Ok(expected) = hex::decode(signature) else {
        return false;
    };
    mac_for(token, body).is_some_and(|mac| mac.verify_slice(&expected).is_ok())
}
