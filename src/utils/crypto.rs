// src/utils/crypto.rs
//! Symmetric primitives used on the inbound path.
//!
//! HMAC and the constant-time comparison both come from `ring`, the same
//! backend `jsonwebtoken` uses for the outbound RS256 signature.

use ring::{constant_time, hmac};

/// Computes HMAC-SHA256 of `data` under `key` and returns it lowercase hex-encoded.
///
/// # Arguments
/// * `key` - Shared secret bytes
/// * `data` - Message bytes, hashed exactly as given
///
/// # Returns
/// 64-character lowercase hex string
pub fn hmac_sha256_hex(key: &[u8], data: &[u8]) -> String {
    let key = hmac::Key::new(hmac::HMAC_SHA256, key);
    hex::encode(hmac::sign(&key, data).as_ref())
}

/// Compares two byte strings without branching on their contents.
///
/// Unequal lengths short-circuit to `false` before any byte is inspected, so
/// the running time depends on the lengths but never on the position of the
/// first differing byte.
pub fn constant_time_eq(expected: &[u8], provided: &[u8]) -> bool {
    if expected.len() != provided.len() {
        return false;
    }
    constant_time::verify_slices_are_equal(expected, provided).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hmac_known_answer() {
        // RFC 4231 test case 2
        let digest = hmac_sha256_hex(b"Jefe", b"what do ya want for nothing?");
        assert_eq!(
            digest,
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn test_hmac_output_is_lowercase_hex() {
        let digest = hmac_sha256_hex(b"key", b"");
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn test_constant_time_eq_matches() {
        assert!(constant_time_eq(b"abcdef", b"abcdef"));
        assert!(constant_time_eq(b"", b""));
    }

    #[test]
    fn test_constant_time_eq_rejects_length_mismatch() {
        assert!(!constant_time_eq(b"abcdef", b"abcde"));
        assert!(!constant_time_eq(b"abc", b""));
    }

    #[test]
    fn test_constant_time_eq_rejects_difference_at_any_position() {
        let reference = b"0123456789abcdef".to_vec();
        for position in 0..reference.len() {
            let mut mutated = reference.clone();
            mutated[position] ^= 0x01;
            assert!(!constant_time_eq(&reference, &mutated), "position {}", position);
        }
    }
}
