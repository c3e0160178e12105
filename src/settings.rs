// src/settings.rs
//! Process configuration loaded once at startup.
//!
//! Values come from the environment (optionally seeded from a `.env` file) and
//! are deserialized into [`Settings`]. The resulting value is immutable and is
//! handed explicitly to the components that need it.
//!
//! ## Environment Variables
//! - `REVOLUT_API_URL`: Remote API base URL
//! - `REVOLUT_CLIENT_ID`: Client identifier used as assertion issuer and subject
//! - `REVOLUT_PRIVATE_KEY`: Inline PEM private key (takes precedence)
//! - `REVOLUT_PRIVATE_KEY_PATH`: Path to a PEM private key file
//! - `REVOLUT_AUDIENCE`: Assertion audience URI
//! - `REVOLUT_TOKEN_LIFETIME_SECS`: Assertion lifetime (default 3600)
//! - `REVOLUT_TOKEN_REFRESH_MARGIN_SECS`: Reissue window before expiry (default 60)
//! - `WEBHOOK_SECRET`: Shared secret for inbound webhook signatures
//! - `HOST` / `PORT`: Listen address (default 127.0.0.1:3006)
//! - `CORS_ORIGIN`: (Optional) allowed browser origin

use crate::errors::GatewayError;
use config::{Config, Environment};
use serde::Deserialize;

pub const DEFAULT_API_URL: &str = "https://b2b.revolut.com/api/1.0";
pub const DEFAULT_AUDIENCE: &str = "https://revolut.com";
pub const DEFAULT_TOKEN_LIFETIME_SECS: u64 = 3600;
pub const DEFAULT_REFRESH_MARGIN_SECS: u64 = 60;

/// Immutable configuration surface consumed by the gateway.
///
/// Not `Debug`: carries the private key and webhook secret.
#[derive(Clone, Deserialize)]
pub struct Settings {
    #[serde(default = "default_api_url")]
    pub revolut_api_url: String,

    #[serde(default)]
    pub revolut_client_id: String,

    /// Inline PEM value. Wins over `revolut_private_key_path` when both are set.
    #[serde(default)]
    pub revolut_private_key: Option<String>,

    #[serde(default)]
    pub revolut_private_key_path: Option<String>,

    #[serde(default = "default_audience")]
    pub revolut_audience: String,

    #[serde(default = "default_token_lifetime")]
    pub revolut_token_lifetime_secs: u64,

    #[serde(default = "default_refresh_margin")]
    pub revolut_token_refresh_margin_secs: u64,

    #[serde(default)]
    pub webhook_secret: Option<String>,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub cors_origin: Option<String>,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_audience() -> String {
    DEFAULT_AUDIENCE.to_string()
}

fn default_token_lifetime() -> u64 {
    DEFAULT_TOKEN_LIFETIME_SECS
}

fn default_refresh_margin() -> u64 {
    DEFAULT_REFRESH_MARGIN_SECS
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3006
}

impl Settings {
    /// Loads settings from the process environment.
    ///
    /// A `.env` file in the working directory is read first if present; real
    /// environment variables take precedence over it.
    ///
    /// # Errors
    /// Returns [`GatewayError::Settings`] if a value cannot be converted to
    /// its target type (e.g. a non-numeric `PORT`).
    pub fn load() -> Result<Self, GatewayError> {
        dotenv::dotenv().ok();

        let config = Config::builder()
            .add_source(Environment::default())
            .build()?;

        Self::from_config(config)
    }

    /// Deserializes settings from an already assembled [`Config`].
    pub fn from_config(config: Config) -> Result<Self, GatewayError> {
        Ok(config.try_deserialize()?)
    }

    /// Inline private key, with empty values treated as absent.
    pub fn inline_private_key(&self) -> Option<&str> {
        non_empty(self.revolut_private_key.as_deref())
    }

    /// Private key file path, with empty values treated as absent.
    pub fn private_key_path(&self) -> Option<&str> {
        non_empty(self.revolut_private_key_path.as_deref())
    }

    /// Webhook secret, with empty values treated as absent.
    pub fn webhook_secret(&self) -> Option<&str> {
        non_empty(self.webhook_secret.as_deref())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
