// src/utils/serialization.rs
//! Compact-token segment encoding.
//!
//! Each segment is the canonical JSON form of a value, base64url-encoded
//! without padding. Canonical here means serde's struct-field order, which is
//! fixed at compile time, so the same value always yields the same bytes.

use serde::{de::DeserializeOwned, Serialize};

/// Error raised while decoding a segment.
#[derive(Debug, thiserror::Error)]
pub enum SegmentError {
    #[error("segment is not valid base64url: {0}")]
    Encoding(#[from] base64::DecodeError),
    #[error("segment is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Base64url (unpadded) encoding of raw bytes.
pub fn base64url_encode(bytes: &[u8]) -> String {
    base64::encode_config(bytes, base64::URL_SAFE_NO_PAD)
}

/// Serializes `value` to JSON and encodes it as a token segment.
///
/// # Errors
/// Returns `serde_json::Error` if the value cannot be represented as JSON.
pub fn encode_segment<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let json = serde_json::to_vec(value)?;
    Ok(base64url_encode(&json))
}

/// Decodes a token segment back into a typed value.
pub fn decode_segment<T: DeserializeOwned>(segment: &str) -> Result<T, SegmentError> {
    let bytes = base64::decode_config(segment, base64::URL_SAFE_NO_PAD)?;
    Ok(serde_json::from_slice(&bytes)?)
}
