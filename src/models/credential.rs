// src/models/credential.rs
//! Client assertion data model.
//!
//! The assertion is a compact JWS: `header.claims.signature`, each segment
//! base64url-encoded without padding. It is presented to the remote API as a
//! bearer credential and is never persisted.

use crate::utils::serialization::{decode_segment, SegmentError};
use serde::{Deserialize, Serialize};

/// Signing algorithm agreed with the remote party.
pub const ASSERTION_ALGORITHM: &str = "RS256";

/// Token type carried in the header.
pub const ASSERTION_TYPE: &str = "JWT";

/// JOSE header of the assertion.
///
/// Field order is part of the wire contract: the encoded header must be
/// byte-identical every time it is produced.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AssertionHeader {
    pub alg: String,
    pub typ: String,
}

impl Default for AssertionHeader {
    fn default() -> Self {
        AssertionHeader {
            alg: ASSERTION_ALGORITHM.to_string(),
            typ: ASSERTION_TYPE.to_string(),
        }
    }
}

/// Registered claims identifying this client to the remote API.
///
/// # Fields
/// - `issuer` / `subject`: both the configured client identifier
/// - `audience`: the remote party URI
/// - `issued_at` / `expires_at`: epoch seconds, `expires_at = issued_at + lifetime`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AssertionClaims {
    #[serde(rename = "iss")]
    pub issuer: String,
    #[serde(rename = "sub")]
    pub subject: String,
    #[serde(rename = "aud")]
    pub audience: String,
    #[serde(rename = "iat")]
    pub issued_at: i64,
    #[serde(rename = "exp")]
    pub expires_at: i64,
}

/// A minted assertion together with its decoded parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedAssertion {
    pub header: AssertionHeader,
    pub claims: AssertionClaims,
    /// Base64url-encoded signature segment
    pub signature: String,
    token: String,
}

impl SignedAssertion {
    pub(crate) fn new(
        header: AssertionHeader,
        claims: AssertionClaims,
        signing_input: String,
        signature: String,
    ) -> Self {
        let token = format!("{}.{}", signing_input, signature);
        SignedAssertion {
            header,
            claims,
            signature,
            token,
        }
    }

    /// Compact `header.claims.signature` form sent as the bearer token.
    pub fn as_str(&self) -> &str {
        &self.token
    }

    pub fn expires_at(&self) -> i64 {
        self.claims.expires_at
    }

    /// Value for an `Authorization` header.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

/// Compact token split into its three raw segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompactParts<'a> {
    pub header: &'a str,
    pub claims: &'a str,
    pub signature: &'a str,
}

impl<'a> CompactParts<'a> {
    /// Splits a compact token. Returns `None` unless there are exactly three segments.
    pub fn split(token: &'a str) -> Option<Self> {
        let mut segments = token.split('.');
        let parts = CompactParts {
            header: segments.next()?,
            claims: segments.next()?,
            signature: segments.next()?,
        };
        match segments.next() {
            Some(_) => None,
            None => Some(parts),
        }
    }

    /// `header.claims`, the exact bytes that were signed.
    pub fn signing_input(&self) -> String {
        format!("{}.{}", self.header, self.claims)
    }

    pub fn decode_header(&self) -> Result<AssertionHeader, SegmentError> {
        decode_segment(self.header)
    }

    pub fn decode_claims(&self) -> Result<AssertionClaims, SegmentError> {
        decode_segment(self.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_requires_three_segments() {
        assert!(CompactParts::split("a.b.c").is_some());
        assert!(CompactParts::split("a.b").is_none());
        assert!(CompactParts::split("a.b.c.d").is_none());
    }

    #[test]
    fn test_claims_use_registered_names() {
        let claims = AssertionClaims {
            issuer: "client".into(),
            subject: "client".into(),
            audience: "https://revolut.com".into(),
            issued_at: 10,
            expires_at: 3610,
        };
        let json = serde_json::to_string(&claims).unwrap();
        assert_eq!(
            json,
            r#"{"iss":"client","sub":"client","aud":"https://revolut.com","iat":10,"exp":3610}"#
        );
    }

    #[test]
    fn test_default_header() {
        let json = serde_json::to_string(&AssertionHeader::default()).unwrap();
        assert_eq!(json, r#"{"alg":"RS256","typ":"JWT"}"#);
    }
}
