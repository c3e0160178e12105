// src/auth/key_management.rs
//! Loading of the asymmetric signing key and the webhook shared secret.
//!
//! Both are read once at startup and held for the process lifetime. Absence
//! of either is a valid, degraded state:
//! - no signing key: outbound calls go out unauthenticated
//! - no shared secret: every inbound webhook is rejected
//!
//! Neither type prints its contents through `Debug`.

use crate::settings::Settings;
use crate::errors::GatewayError;
use jsonwebtoken::EncodingKey;
use std::fmt;
use std::fs;

/// Where the signing key was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySource {
    Inline,
    File(String),
}

impl fmt::Display for KeySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeySource::Inline => f.write_str("environment variable"),
            KeySource::File(path) => write!(f, "file {}", path),
        }
    }
}

/// RSA private key used to sign client assertions.
#[derive(Clone)]
pub struct SigningKeyMaterial {
    encoding_key: EncodingKey,
    source: KeySource,
}

impl SigningKeyMaterial {
    /// Parses a PEM-encoded RSA private key (PKCS#1 or PKCS#8).
    ///
    /// # Errors
    /// Returns [`GatewayError::Configuration`] if the value is not an RSA PEM.
    /// The error message never includes the key itself.
    pub fn from_pem(pem: &str, source: KeySource) -> Result<Self, GatewayError> {
        let encoding_key = EncodingKey::from_rsa_pem(pem.as_bytes()).map_err(|e| {
            GatewayError::Configuration(format!("signing key from {} is not a valid RSA PEM: {}", source, e))
        })?;
        Ok(SigningKeyMaterial {
            encoding_key,
            source,
        })
    }

    /// Resolves the signing key from settings.
    ///
    /// # Precedence
    /// 1. `REVOLUT_PRIVATE_KEY` (inline; literal `\n` sequences are expanded)
    /// 2. `REVOLUT_PRIVATE_KEY_PATH` (read from disk)
    ///
    /// # Returns
    /// - `Ok(Some(key))` when a key was found and parsed
    /// - `Ok(None)` when no key is configured or the key file is unreadable
    /// - `Err` when a key was found but is malformed
    pub fn from_settings(settings: &Settings) -> Result<Option<Self>, GatewayError> {
        if let Some(inline) = settings.inline_private_key() {
            let key = Self::from_pem(&expand_escaped_newlines(inline), KeySource::Inline)?;
            log::info!("Using signing key from {}", key.source);
            return Ok(Some(key));
        }

        if let Some(path) = settings.private_key_path() {
            return match fs::read_to_string(path) {
                Ok(pem) => {
                    let key = Self::from_pem(&pem, KeySource::File(path.to_string()))?;
                    log::info!("Signing key loaded from {}", path);
                    Ok(Some(key))
                }
                Err(e) => {
                    log::warn!(
                        "Could not read signing key from {} ({}). Outbound calls will be unauthenticated.",
                        path,
                        e
                    );
                    Ok(None)
                }
            };
        }

        log::warn!(
            "No signing key configured (REVOLUT_PRIVATE_KEY or REVOLUT_PRIVATE_KEY_PATH). Outbound calls will be unauthenticated."
        );
        Ok(None)
    }

    pub fn source(&self) -> &KeySource {
        &self.source
    }

    pub(crate) fn encoding_key(&self) -> &EncodingKey {
        &self.encoding_key
    }
}

impl fmt::Debug for SigningKeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKeyMaterial")
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

/// Symmetric secret shared with the webhook sender.
#[derive(Clone)]
pub struct SharedSecret(Vec<u8>);

impl SharedSecret {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        SharedSecret(secret.into())
    }

    pub fn from_settings(settings: &Settings) -> Option<Self> {
        settings.webhook_secret().map(SharedSecret::new)
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedSecret(..)")
    }
}

fn expand_escaped_newlines(pem: &str) -> String {
    pem.replace("\\n", "\n")
}
