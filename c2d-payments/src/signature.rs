use std::time::{SystemTime, UNIX_EPOCH};

use hmac::{Hmac, Mac};
use sha2::{Sha256, Sha512};

use c2d_core::{CoreError, CoreResult};

type HmacSha256 = Hmac<Sha256>;
type HmacSha512 = Hmac<Sha512>;

/// Replay window for timestamped signature schemes, in seconds.
pub const DEFAULT_TOLERANCE_SECS: i64 = 300;

/// Verify a Stripe-style signature header: `t=<unix>,v1=<hex>` where the
/// digest is HMAC-SHA256 over `"{t}.{raw_body}"`. The timestamp must fall
/// within `tolerance` seconds of now.
pub fn verify_timestamped_hmac_sha256(
    raw_body: &[u8],
    header: &str,
    secret: &str,
    tolerance: i64,
) -> CoreResult<()> {
    let mut timestamp: Option<&str> = None;
    let mut received: Option<&str> = None;
    for part in header.split(',') {
        if let Some(t) = part.trim().strip_prefix("t=") {
            timestamp = Some(t);
        } else if let Some(v) = part.trim().strip_prefix("v1=") {
            received = Some(v);
        }
    }

    let timestamp = timestamp.ok_or_else(|| reject("missing timestamp"))?;
    let received = received.ok_or_else(|| reject("missing v1 signature"))?;

    let webhook_time: i64 = timestamp.parse().map_err(|_| reject("bad timestamp"))?;
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|_| reject("clock error"))?
        .as_secs() as i64;
    if (now - webhook_time).abs() > tolerance {
        return Err(reject("timestamp outside tolerance"));
    }

    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| reject("bad secret"))?;
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(raw_body);
    let expected = mac.finalize().into_bytes();

    let received = hex::decode(received).map_err(|_| reject("signature is not hex"))?;
    constant_time_eq(&received, &expected)
}

/// Verify a Paystack-style signature header: a single hex HMAC-SHA512
/// digest of the raw body.
pub fn verify_hmac_sha512(raw_body: &[u8], header: &str, secret: &str) -> CoreResult<()> {
    let mut mac =
        HmacSha512::new_from_slice(secret.as_bytes()).map_err(|_| reject("bad secret"))?;
    mac.update(raw_body);
    let expected = mac.finalize().into_bytes();

    let received = hex::decode(header.trim()).map_err(|_| reject("signature is not hex"))?;
    constant_time_eq(&received, &expected)
}

fn constant_time_eq(received: &[u8], expected: &[u8]) -> CoreResult<()> {
    if received.len() != expected.len() {
        return Err(reject("signature mismatch"));
    }
    let mut diff = 0u8;
    for (a, b) in received.iter().zip(expected.iter()) {
        diff |= a ^ b;
    }
    if diff == 0 {
        Ok(())
    } else {
        Err(reject("signature mismatch"))
    }
}

fn reject(detail: &str) -> CoreError {
    CoreError::Unauthorized(format!("Webhook signature rejected: {}", detail))
}
