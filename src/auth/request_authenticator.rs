// src/auth/request_authenticator.rs
//! Outbound request authentication.
//!
//! Attaches `Authorization: Bearer <assertion>` to every request bound for the
//! remote API. A minted assertion is reused until it is within the refresh
//! margin of its expiry; the cached value is an immutable `Arc` swapped
//! wholesale under a lock, so readers never see a token paired with another
//! token's expiry.

use crate::auth::assertion_issuer::AssertionIssuer;
use crate::errors::GatewayError;
use crate::models::credential::SignedAssertion;
use reqwest::header::{HeaderValue, AUTHORIZATION};
use std::sync::{Arc, PoisonError, RwLock};

/// Signs outgoing requests, caching the current assertion.
#[derive(Debug)]
pub struct RequestAuthenticator {
    issuer: AssertionIssuer,
    refresh_margin_secs: i64,
    cached: RwLock<Option<Arc<SignedAssertion>>>,
}

impl RequestAuthenticator {
    /// Wraps an issuer.
    ///
    /// When the issuer has no signing key the authenticator runs in
    /// pass-through mode; this is logged here, once, rather than per request.
    pub fn new(issuer: AssertionIssuer, refresh_margin_secs: u64) -> Self {
        if !issuer.has_signing_key() {
            log::warn!("Outbound requests will be sent without an Authorization header");
        }

        RequestAuthenticator {
            issuer,
            refresh_margin_secs: i64::try_from(refresh_margin_secs).unwrap_or(i64::MAX),
            cached: RwLock::new(None),
        }
    }

    /// Whether outgoing requests receive a bearer assertion.
    pub fn is_signing(&self) -> bool {
        self.issuer.has_signing_key()
    }

    /// Returns `request` with the bearer assertion attached.
    ///
    /// In pass-through mode the request is returned unmodified.
    ///
    /// # Errors
    /// Returns [`GatewayError::Signing`] if minting a fresh assertion fails.
    pub fn authenticate(
        &self,
        mut request: reqwest::Request,
    ) -> Result<reqwest::Request, GatewayError> {
        if let Some(assertion) = self.current_assertion()? {
            let mut value = HeaderValue::from_str(&assertion.bearer())?;
            value.set_sensitive(true);
            request.headers_mut().insert(AUTHORIZATION, value);
        }
        Ok(request)
    }

    /// The assertion that would be attached right now, minting if needed.
    pub fn current_assertion(&self) -> Result<Option<Arc<SignedAssertion>>, GatewayError> {
        self.current_assertion_at(chrono::Utc::now().timestamp())
    }

    pub(crate) fn current_assertion_at(
        &self,
        now: i64,
    ) -> Result<Option<Arc<SignedAssertion>>, GatewayError> {
        if !self.issuer.has_signing_key() {
            return Ok(None);
        }

        {
            let cached = self.cached.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(assertion) = cached.as_ref().filter(|a| self.is_fresh(a, now)) {
                return Ok(Some(Arc::clone(assertion)));
            }
        }

        let mut cached = self.cached.write().unwrap_or_else(PoisonError::into_inner);
        // Another caller may have refreshed while we waited for the write lock.
        if let Some(assertion) = cached.as_ref().filter(|a| self.is_fresh(a, now)) {
            return Ok(Some(Arc::clone(assertion)));
        }

        let fresh = Arc::new(self.issuer.mint_at(now)?);
        log::debug!("Minted client assertion valid until {}", fresh.expires_at());
        *cached = Some(Arc::clone(&fresh));
        Ok(Some(fresh))
    }

    fn is_fresh(&self, assertion: &SignedAssertion, now: i64) -> bool {
        now.saturating_add(self.refresh_margin_secs) < assertion.expires_at()
    }
}
