//! Slack request signature verification
//!
//! Slack signs every request it sends with the app's signing secret:
//!
//! ```text
//! X-Slack-Signature = "v0=" + hex(HMAC-SHA256(signing_secret, "v0:" + timestamp + ":" + body))
//! ```
//!
//! Requests whose timestamp is more than five minutes away from the local
//! clock are rejected to limit replays.

use axum::{
    body::{Body, Bytes},
    extract::{rejection::BytesRejection, FromRequest, Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;
use tracing::warn;

use crate::models::AppState;

type HmacSha256 = Hmac<Sha256>;

pub const TIMESTAMP_HEADER: &str = "x-slack-request-timestamp";
pub const SIGNATURE_HEADER: &str = "x-slack-signature";

const SIGNATURE_VERSION: &str = "v0";
const MAX_CLOCK_SKEW_SECS: i64 = 60 * 5;

#[derive(Debug, Error)]
pub enum SignatureError {
    #[error("missing {0} header")]
    MissingHeader(&'static str),

    #[error("invalid request timestamp")]
    InvalidTimestamp,

    #[error("request timestamp outside the allowed window")]
    StaleTimestamp,

    #[error("signature does not match")]
    Mismatch,

    #[error("invalid signing key")]
    InvalidKey,

    #[error("failed to read request body: {0}")]
    Body(BytesRejection),
}

impl IntoResponse for SignatureError {
    fn into_response(self) -> Response {
        warn!(error = %self, "Rejected Slack request");
        match self {
            SignatureError::Body(rejection) => rejection.into_response(),
            _ => (StatusCode::UNAUTHORIZED, "Invalid Slack signature").into_response(),
        }
    }
}

fn signing_mac(secret: &str, timestamp: &str, body: &[u8]) -> Result<HmacSha256, SignatureError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| SignatureError::InvalidKey)?;
    mac.update(SIGNATURE_VERSION.as_bytes());
    mac.update(b":");
    mac.update(timestamp.as_bytes());
    mac.update(b":");
    mac.update(body);
    Ok(mac)
}

/// Signature Slack would send for `body` at `timestamp`.
pub fn compute_signature(secret: &str, timestamp: &str, body: &[u8]) -> Result<String, SignatureError> {
    let mac = signing_mac(secret, timestamp, body)?;
    Ok(format!("{}={}", SIGNATURE_VERSION, hex::encode(mac.finalize().into_bytes())))
}

/// Check a request signature against the signing secret.
///
/// `now` is the current Unix time in seconds. The digest comparison is
/// constant-time.
pub fn verify_signature(
    secret: &str,
    timestamp: &str,
    signature: &str,
    body: &[u8],
    now: i64,
) -> Result<(), SignatureError> {
    let sent_at: i64 = timestamp.trim().parse().map_err(|_| SignatureError::InvalidTimestamp)?;
    if (now - sent_at).abs() > MAX_CLOCK_SKEW_SECS {
        return Err(SignatureError::StaleTimestamp);
    }

    let digest = signature
        .strip_prefix("v0=")
        .and_then(|hex_digest| hex::decode(hex_digest).ok())
        .ok_or(SignatureError::Mismatch)?;

    signing_mac(secret, timestamp, body)?
        .verify_slice(&digest)
        .map_err(|_| SignatureError::Mismatch)
}

fn header_value(headers: &HeaderMap, name: &'static str) -> Result<String, SignatureError> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .ok_or(SignatureError::MissingHeader(name))
}

/// Middleware rejecting requests that were not signed by Slack.
///
/// The body is buffered so it can be hashed, then handed on unchanged. The
/// router's body limit applies, so oversized payloads get a 413.
pub async fn verify_slack_signature(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, SignatureError> {
    let (parts, body) = req.into_parts();
    let timestamp = header_value(&parts.headers, TIMESTAMP_HEADER)?;
    let signature = header_value(&parts.headers, SIGNATURE_HEADER)?;

    let mut buffered = Request::new(body);
    *buffered.extensions_mut() = parts.extensions.clone();
    let bytes = Bytes::from_request(buffered, &state)
        .await
        .map_err(SignatureError::Body)?;

    verify_signature(
        &state.config.slack.signing_secret,
        &timestamp,
        &signature,
        &bytes,
        chrono::Utc::now().timestamp(),
    )?;

    Ok(next.run(Request::from_parts(parts, Body::from(bytes))).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "8f742231b10e8888abcd99yyyzzz85a5";
    const NOW: i64 = 1_531_420_618;

    #[test]
    fn test_signature_format() {
        let signature = compute_signature(SECRET, "1531420618", b"token=abc").unwrap();
        assert!(signature.starts_with("v0="));
        assert_eq!(signature.len(), 3 + 64);
    }

    #[test]
    fn test_valid_signature_is_accepted() {
        let body = br#"{"type":"url_verification","challenge":"abc"}"#;
        let signature = compute_signature(SECRET, "1531420618", body).unwrap();

        assert!(verify_signature(SECRET, "1531420618", &signature, body, NOW).is_ok());
        assert!(verify_signature(SECRET, "1531420618", &signature, body, NOW + 299).is_ok());
    }

    #[test]
    fn test_tampered_body_is_rejected() {
        let signature = compute_signature(SECRET, "1531420618", b"original").unwrap();

        let err = verify_signature(SECRET, "1531420618", &signature, b"tampered", NOW).unwrap_err();
        assert!(matches!(err, SignatureError::Mismatch));
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let signature = compute_signature("other-secret", "1531420618", b"body").unwrap();

        assert!(matches!(
            verify_signature(SECRET, "1531420618", &signature, b"body", NOW),
            Err(SignatureError::Mismatch)
        ));
    }

    #[test]
    fn test_stale_and_invalid_timestamps() {
        let signature = compute_signature(SECRET, "1531420618", b"body").unwrap();

        assert!(matches!(
            verify_signature(SECRET, "1531420618", &signature, b"body", NOW + 301),
            Err(SignatureError::StaleTimestamp)
        ));
        assert!(matches!(
            verify_signature(SECRET, "yesterday", &signature, b"body", NOW),
            Err(SignatureError::InvalidTimestamp)
        ));
    }

    #[test]
    fn test_malformed_signature_is_rejected() {
        for signature in ["", "v1=abcd", "v0=not-hex", "v0=abcd"] {
            assert!(matches!(
                verify_signature(SECRET, "1531420618", signature, b"body", NOW),
                Err(SignatureError::Mismatch)
            ));
        }
    }
}
