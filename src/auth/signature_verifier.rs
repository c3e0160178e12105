// src/auth/signature_verifier.rs
//! Inbound webhook signature verification.
//!
//! The sender signs the raw request body with HMAC-SHA256 under the shared
//! secret and sends the hex digest in a header. Verification recomputes the
//! digest over the body exactly as received and compares in constant time.
//!
//! # Timing
//! The comparison cost does not depend on where two equal-length signatures
//! first differ. A signature of the wrong length is rejected immediately, so
//! the cost does depend on length; the expected length (64 hex characters)
//! is public anyway.

use crate::auth::key_management::SharedSecret;
use crate::settings::Settings;
use crate::utils::crypto::{constant_time_eq, hmac_sha256_hex};

/// Checks webhook signatures against the shared secret.
#[derive(Debug, Clone)]
pub struct SignatureVerifier {
    secret: Option<SharedSecret>,
}

impl SignatureVerifier {
    /// `None` makes every verification fail closed.
    pub fn new(secret: Option<SharedSecret>) -> Self {
        SignatureVerifier { secret }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(SharedSecret::from_settings(settings))
    }

    pub fn is_configured(&self) -> bool {
        self.secret.is_some()
    }

    /// Verifies `provided_signature_hex` against the HMAC of `raw_body`.
    ///
    /// Never panics on untrusted input: a missing secret, an empty or
    /// malformed signature, or a length mismatch all yield `false`.
    pub fn verify(&self, raw_body: &[u8], provided_signature_hex: &str) -> bool {
        let secret = match &self.secret {
            Some(secret) => secret,
            None => {
                log::warn!("Webhook secret not configured; rejecting webhook");
                return false;
            }
        };

        let expected = hmac_sha256_hex(secret.as_bytes(), raw_body);
        constant_time_eq(expected.as_bytes(), provided_signature_hex.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &[u8] = br#"{"event":"TransactionCreated","data":{"id":"tx_1"}}"#;
    const BODY_SIGNATURE: &str = "3f67ab6f769751e02a32ea0ec5e029eeaaf9f8e39986c7d4f6fc9237ba5c9440";

    fn verifier() -> SignatureVerifier {
        SignatureVerifier::new(Some(SharedSecret::new("s3cret")))
    }

    #[test]
    fn test_accepts_known_signature() {
        assert!(verifier().verify(BODY, BODY_SIGNATURE));
    }

    #[test]
    fn test_accepts_freshly_computed_signatures() {
        let cases: [(&str, &[u8]); 3] = [
            ("s3cret", b""),
            ("another secret", b"plain text body"),
            ("k", b"\x00\xff binary \xfe"),
        ];
        for (secret, body) in cases {
            let verifier = SignatureVerifier::new(Some(SharedSecret::new(secret)));
            assert!(verifier.verify(body, &hmac_sha256_hex(secret.as_bytes(), body)));
        }
    }

    #[test]
    fn test_rejects_single_bit_body_mutation() {
        let verifier = verifier();
        for index in 0..BODY.len() {
            for bit in 0..8 {
                let mut mutated = BODY.to_vec();
                mutated[index] ^= 1 << bit;
                assert!(!verifier.verify(&mutated, BODY_SIGNATURE));
            }
        }
    }

    #[test]
    fn test_rejects_single_bit_signature_mutation() {
        let verifier = verifier();
        for index in 0..BODY_SIGNATURE.len() {
            for bit in 0..7 {
                let mut mutated = BODY_SIGNATURE.as_bytes().to_vec();
                mutated[index] ^= 1 << bit;
                let mutated = String::from_utf8_lossy(&mutated).into_owned();
                assert!(!verifier.verify(BODY, &mutated));
            }
        }
    }

    #[test]
    fn test_rejects_wrong_length_and_empty_signature() {
        let verifier = verifier();
        assert!(!verifier.verify(BODY, ""));
        assert!(!verifier.verify(BODY, &BODY_SIGNATURE[..63]));
        assert!(!verifier.verify(BODY, &format!("{}00", BODY_SIGNATURE)));
        assert!(!verifier.verify(BODY, "not hex at all"));
    }

    #[test]
    fn test_uppercase_hex_is_not_accepted() {
        assert!(!verifier().verify(BODY, &BODY_SIGNATURE.to_uppercase()));
    }

    #[test]
    fn test_fails_closed_without_secret() {
        let verifier = SignatureVerifier::new(None);
        assert!(!verifier.is_configured());
        assert!(!verifier.verify(BODY, BODY_SIGNATURE));
    }

    #[test]
    fn test_reserialized_body_does_not_verify() {
        let reserialized = br#"{"event": "TransactionCreated", "data": {"id": "tx_1"}}"#;
        assert!(!verifier().verify(reserialized, BODY_SIGNATURE));
    }
}
