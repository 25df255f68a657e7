//! Slack request signing.
//!
//! Slack signs every request with `v0=hex(hmac_sha256(secret, "v0:{ts}:{body}"))`
//! and sends the timestamp alongside. Requests older than five minutes are
//! rejected to limit replay.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "x-slack-signature";
pub const TIMESTAMP_HEADER: &str = "x-slack-request-timestamp";

const VERSION: &str = "v0";
const MAX_SKEW_SECS: u64 = 60 * 5;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("missing signature headers")]
    MissingHeaders,
    #[error("timestamp is not a number")]
    BadTimestamp,
    #[error("timestamp outside the replay window")]
    Stale,
    #[error("signature is not v0 hex")]
    Malformed,
    #[error("signature mismatch")]
    Mismatch,
}

/// Computes the `v0=` signature Slack would send for `body`.
pub fn sign(secret: &str, timestamp: &str, body: &[u8]) -> String {
    let mac = mac_for(secret, timestamp, body);
    format!("{VERSION}={}", hex::encode(mac.finalize().into_bytes()))
}

/// Checks a request against the signing secret. `now` is unix seconds.
pub fn verify(
    secret: &str,
    timestamp: &str,
    signature: &str,
    body: &[u8],
    now: i64,
) -> Result<(), SignatureError> {
    let sent_at: i64 = timestamp.parse().map_err(|_| SignatureError::BadTimestamp)?;
    if now.abs_diff(sent_at) > MAX_SKEW_SECS {
        return Err(SignatureError::Stale);
    }

    let expected = signature
        .strip_prefix("v0=")
        .and_then(|hex_sig| hex::decode(hex_sig).ok())
        .ok_or(SignatureError::Malformed)?;

    mac_for(secret, timestamp, body)
        .verify_slice(&expected)
        .map_err(|_| SignatureError::Mismatch)
}

fn mac_for(secret: &str, timestamp: &str, body: &[u8]) -> HmacSha256 {
    // HMAC accepts keys of any length.
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("hmac takes any key size");
    mac.update(VERSION.as_bytes());
    mac.update(b":");
    mac.update(timestamp.as_bytes());
    mac.update(b":");
    mac.update(body);
    mac
}
