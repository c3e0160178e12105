// src/auth/assertion_issuer.rs
//! Client assertion issuance.
//!
//! Mints the short-lived RS256 assertion that identifies this client to the
//! remote API. Issuance is a pure function of the key, the configured
//! identity and the clock reading passed in; caching lives in
//! [`RequestAuthenticator`](crate::auth::request_authenticator::RequestAuthenticator).
//!
//! # Token layout
//! ```text
//! base64url({"alg":"RS256","typ":"JWT"})
//!   . base64url({"iss":..,"sub":..,"aud":..,"iat":..,"exp":..})
//!   . base64url(RS256(header "." claims))
//! ```

use crate::auth::key_management::SigningKeyMaterial;
use crate::settings::Settings;
use crate::errors::GatewayError;
use crate::models::credential::{AssertionClaims, AssertionHeader, SignedAssertion};
use crate::utils::serialization::encode_segment;
use jsonwebtoken::{crypto, Algorithm};

/// Builds and signs client assertions.
#[derive(Debug, Clone)]
pub struct AssertionIssuer {
    signing_key: Option<SigningKeyMaterial>,
    client_id: String,
    audience: String,
    lifetime_secs: i64,
}

impl AssertionIssuer {
    /// # Arguments
    /// * `signing_key` - RSA key, or `None` for degraded (unauthenticated) mode
    /// * `client_id` - Used as both `iss` and `sub`
    /// * `audience` - Remote party URI placed in `aud`
    /// * `lifetime_secs` - Distance between `iat` and `exp`
    pub fn new(
        signing_key: Option<SigningKeyMaterial>,
        client_id: impl Into<String>,
        audience: impl Into<String>,
        lifetime_secs: u64,
    ) -> Self {
        AssertionIssuer {
            signing_key,
            client_id: client_id.into(),
            audience: audience.into(),
            lifetime_secs: i64::try_from(lifetime_secs).unwrap_or(i64::MAX),
        }
    }

    /// Loads the signing key and identity from settings.
    ///
    /// # Errors
    /// Propagates [`GatewayError::Configuration`] for a malformed key. A
    /// missing key is not an error.
    pub fn from_settings(settings: &Settings) -> Result<Self, GatewayError> {
        Ok(Self::new(
            SigningKeyMaterial::from_settings(settings)?,
            settings.revolut_client_id.clone(),
            settings.revolut_audience.clone(),
            settings.revolut_token_lifetime_secs,
        ))
    }

    pub fn has_signing_key(&self) -> bool {
        self.signing_key.is_some()
    }

    pub fn lifetime_secs(&self) -> i64 {
        self.lifetime_secs
    }

    /// Mints an assertion stamped with the current time.
    pub fn mint(&self) -> Result<SignedAssertion, GatewayError> {
        self.mint_at(chrono::Utc::now().timestamp())
    }

    /// Mints an assertion as if the clock read `issued_at` epoch seconds.
    ///
    /// Same key, identity and `issued_at` always produce the same token,
    /// since RSASSA-PKCS1-v1_5 is deterministic.
    ///
    /// # Errors
    /// - [`GatewayError::Configuration`] if no signing key is loaded
    /// - [`GatewayError::Signing`] if the RSA operation fails
    pub fn mint_at(&self, issued_at: i64) -> Result<SignedAssertion, GatewayError> {
        let signing_key = self.signing_key.as_ref().ok_or_else(|| {
            GatewayError::Configuration("no signing key configured".to_string())
        })?;

        let header = AssertionHeader::default();
        let claims = AssertionClaims {
            issuer: self.client_id.clone(),
            subject: self.client_id.clone(),
            audience: self.audience.clone(),
            issued_at,
            expires_at: issued_at.saturating_add(self.lifetime_secs),
        };

        let signing_input = format!("{}.{}", encode_segment(&header)?, encode_segment(&claims)?);
        let signature = crypto::sign(
            signing_input.as_bytes(),
            signing_key.encoding_key(),
            Algorithm::RS256,
        )?;

        Ok(SignedAssertion::new(header, claims, signing_input, signature))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::key_management::tests::{TEST_PRIVATE_KEY, TEST_PUBLIC_KEY};
    use crate::auth::key_management::KeySource;
    use crate::models::credential::CompactParts;
    use crate::utils::serialization::encode_segment;
    use jsonwebtoken::DecodingKey;

    fn issuer() -> AssertionIssuer {
        let key = SigningKeyMaterial::from_pem(TEST_PRIVATE_KEY, KeySource::Inline).unwrap();
        AssertionIssuer::new(Some(key), "client-123", "https://revolut.com", 3600)
    }

    #[test]
    fn test_token_has_three_segments() {
        let assertion = issuer().mint_at(1_700_000_000).unwrap();
        assert!(CompactParts::split(assertion.as_str()).is_some());
    }

    #[test]
    fn test_segments_reencode_identically() {
        let assertion = issuer().mint_at(1_700_000_000).unwrap();
        let parts = CompactParts::split(assertion.as_str()).unwrap();

        let header = parts.decode_header().unwrap();
        let claims = parts.decode_claims().unwrap();

        assert_eq!(encode_segment(&header).unwrap(), parts.header);
        assert_eq!(encode_segment(&claims).unwrap(), parts.claims);
        assert_eq!(header, assertion.header);
        assert_eq!(claims, assertion.claims);
        assert_eq!(parts.signature, assertion.signature);
    }

    #[test]
    fn test_claims_carry_identity_and_lifetime() {
        let assertion = issuer().mint_at(1_700_000_000).unwrap();
        let claims = &assertion.claims;

        assert_eq!(assertion.header.alg, "RS256");
        assert_eq!(assertion.header.typ, "JWT");
        assert_eq!(claims.issuer, "client-123");
        assert_eq!(claims.subject, "client-123");
        assert_eq!(claims.audience, "https://revolut.com");
        assert_eq!(claims.issued_at, 1_700_000_000);
        assert_eq!(claims.expires_at - claims.issued_at, 3600);
    }

    #[test]
    fn test_lifetime_follows_configuration() {
        let key = SigningKeyMaterial::from_pem(TEST_PRIVATE_KEY, KeySource::Inline).unwrap();
        let issuer = AssertionIssuer::new(Some(key), "c", "aud", 900);

        for now in [0, 1, 1_700_000_000] {
            let claims = issuer.mint_at(now).unwrap().claims;
            assert_eq!(claims.expires_at - claims.issued_at, 900);
        }
    }

    #[test]
    fn test_same_clock_reading_is_deterministic() {
        let issuer = issuer();
        assert_eq!(
            issuer.mint_at(1_700_000_000).unwrap(),
            issuer.mint_at(1_700_000_000).unwrap()
        );
    }

    #[test]
    fn test_signature_verifies_with_public_key() {
        let assertion = issuer().mint_at(1_700_000_000).unwrap();
        let parts = CompactParts::split(assertion.as_str()).unwrap();
        let public_key = DecodingKey::from_rsa_pem(TEST_PUBLIC_KEY.as_bytes()).unwrap();

        let valid = crypto::verify(
            parts.signature,
            parts.signing_input().as_bytes(),
            &public_key,
            Algorithm::RS256,
        )
        .unwrap();
        assert!(valid);

        let tampered = format!("{}x", parts.signing_input());
        let still_valid =
            crypto::verify(parts.signature, tampered.as_bytes(), &public_key, Algorithm::RS256)
                .unwrap();
        assert!(!still_valid);
    }

    #[test]
    fn test_mint_without_key_is_configuration_error() {
        let issuer = AssertionIssuer::new(None, "client-123", "https://revolut.com", 3600);

        assert!(!issuer.has_signing_key());
        assert!(matches!(issuer.mint(), Err(GatewayError::Configuration(_))));
    }
}
