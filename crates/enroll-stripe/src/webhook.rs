//! # Stripe Webhook Signatures
//!
//! Verification of the `Stripe-Signature` header.
//!
//! The header looks like `t=1700000000,v1=5257a8...,v0=...`. The expected
//! `v1` value is the hex HMAC-SHA256 of `"{t}.{raw body}"` keyed with the
//! endpoint secret. The MAC runs over the body bytes exactly as received;
//! re-serializing parsed JSON would change them.

use enroll_core::{CheckoutError, CheckoutResult};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Events that should be enabled in the Stripe Dashboard
pub const REQUIRED_WEBHOOK_EVENTS: &[&str] = &["payment_intent.succeeded"];

struct SignatureHeader {
    timestamp: i64,
    signatures: Vec<Vec<u8>>,
}

fn parse_signature_header(header: &str) -> CheckoutResult<SignatureHeader> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        let Some((key, value)) = part.trim().split_once('=') else {
            continue;
        };
        match key {
            "t" => timestamp = value.parse().ok(),
            "v1" => {
                // A v1 entry that is not hex can never match; skip it.
                if let Ok(sig) = hex::decode(value) {
                    signatures.push(sig);
                }
            }
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or_else(|| {
        CheckoutError::Signature(
            "Unable to extract timestamp and signatures from header".to_string(),
        )
    })?;

    if signatures.is_empty() {
        return Err(CheckoutError::Signature(
            "No signatures found with expected scheme".to_string(),
        ));
    }

    Ok(SignatureHeader {
        timestamp,
        signatures,
    })
}

fn signing_mac(secret: &str, timestamp: i64, payload: &[u8]) -> CheckoutResult<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| CheckoutError::Signature(e.to_string()))?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(mac)
}

/// Verify `header` against `payload` at time `now` (unix seconds).
pub fn verify_signature(
    payload: &[u8],
    header: &str,
    secret: &str,
    now: i64,
    tolerance_secs: i64,
) -> CheckoutResult<()> {
    let parsed = parse_signature_header(header)?;
    let mac = signing_mac(secret, parsed.timestamp, payload)?;

    // verify_slice compares in constant time
    let valid = parsed
        .signatures
        .iter()
        .any(|sig| mac.clone().verify_slice(sig).is_ok());

    if !valid {
        return Err(CheckoutError::Signature(
            "No signatures found matching the expected signature for payload".to_string(),
        ));
    }

    // Only old signatures are rejected; a sender clock ahead of ours is accepted.
    if tolerance_secs > 0 && now - parsed.timestamp > tolerance_secs {
        return Err(CheckoutError::Signature(
            "Timestamp outside the tolerance zone".to_string(),
        ));
    }

    Ok(())
}

/// Build a `Stripe-Signature` header for `payload`, as Stripe would send it.
///
/// Used by tests and local tooling to produce signed webhook deliveries.
pub fn sign_payload(secret: &str, timestamp: i64, payload: &[u8]) -> CheckoutResult<String> {
    let mac = signing_mac(secret, timestamp, payload)?;
    Ok(format!(
        "t={},v1={}",
        timestamp,
        hex::encode(mac.finalize().into_bytes())
    ))
}

/// Print instructions for setting up webhooks
pub fn print_webhook_setup_instructions(endpoint_url: &str) {
    println!("=== Stripe Webhook Setup ===\n");
    println!("1. Go to: https://dashboard.stripe.com/webhooks\n");
    println!("2. Add endpoint: {}\n", endpoint_url);
    println!("3. Select these events:");
    for event in REQUIRED_WEBHOOK_EVENTS {
        println!("   - {}", event);
    }
    println!("\n4. Copy the signing secret (whsec_...) to STRIPE_WEBHOOK_SECRET");
    println!("\n5. For local testing, use Stripe CLI:");
    println!("   stripe listen --forward-to {}", endpoint_url);
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test_secret";
    const PAYLOAD: &[u8] = br#"{"id":"evt_1","type":"payment_intent.succeeded"}"#;

    #[test]
    fn test_parse_signature_header() {
        let parsed = parse_signature_header("t=1234567890,v1=abc123,v1=def456,v0=ffff").unwrap();

        assert_eq!(parsed.timestamp, 1234567890);
        assert_eq!(parsed.signatures.len(), 2);
        assert_eq!(parsed.signatures[0], vec![0xab, 0xc1, 0x23]);
    }

    #[test]
    fn test_parse_rejects_missing_parts() {
        assert!(matches!(
            parse_signature_header("v1=abc123"),
            Err(CheckoutError::Signature(_))
        ));
        assert!(matches!(
            parse_signature_header("t=1234567890"),
            Err(CheckoutError::Signature(_))
        ));
        assert!(parse_signature_header("").is_err());
    }

    #[test]
    fn test_signed_payload_verifies() {
        let header = sign_payload(SECRET, 1_700_000_000, PAYLOAD).unwrap();
        assert!(verify_signature(PAYLOAD, &header, SECRET, 1_700_000_010, 300).is_ok());
    }

    #[test]
    fn test_wrong_secret_fails() {
        let header = sign_payload("whsec_other", 1_700_000_000, PAYLOAD).unwrap();
        let err = verify_signature(PAYLOAD, &header, SECRET, 1_700_000_000, 300).unwrap_err();
        assert!(err.to_string().starts_with("Webhook Error: No signatures found"));
    }

    #[test]
    fn test_reformatted_body_fails() {
        let header = sign_payload(SECRET, 1_700_000_000, PAYLOAD).unwrap();
        let reformatted = br#"{ "id": "evt_1", "type": "payment_intent.succeeded" }"#;
        assert!(verify_signature(reformatted, &header, SECRET, 1_700_000_000, 300).is_err());
    }

    #[test]
    fn test_stale_timestamp_fails() {
        let header = sign_payload(SECRET, 1_700_000_000, PAYLOAD).unwrap();
        let err = verify_signature(PAYLOAD, &header, SECRET, 1_700_000_301, 300).unwrap_err();
        assert_eq!(err.to_string(), "Webhook Error: Timestamp outside the tolerance zone");

        // zero tolerance disables the age check
        assert!(verify_signature(PAYLOAD, &header, SECRET, 1_800_000_000, 0).is_ok());
    }

    #[test]
    fn test_future_timestamp_is_accepted() {
        let header = sign_payload(SECRET, 1_700_000_600, PAYLOAD).unwrap();
        assert!(verify_signature(PAYLOAD, &header, SECRET, 1_700_000_000, 300).is_ok());
    }

    #[test]
    fn test_any_matching_v1_is_enough() {
        let good = sign_payload(SECRET, 1_700_000_000, PAYLOAD).unwrap();
        let good_sig = good.split_once(",v1=").unwrap().1;
        let header = format!("t=1700000000,v1={},v1={}", "00".repeat(32), good_sig);
        assert!(verify_signature(PAYLOAD, &header, SECRET, 1_700_000_000, 300).is_ok());
    }
}
