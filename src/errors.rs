// src/errors.rs
//! Error taxonomy for the gateway.
//!
//! Inbound failures are surfaced to the transport layer as authorization or
//! client errors; everything else collapses into an opaque 500 so that no
//! internal state leaks to the remote peer.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Errors produced by the signing, verification and dispatch paths.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Required key or secret material is missing or unusable.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Inbound webhook signature did not match. Carries no detail.
    #[error("webhook signature rejected")]
    AuthenticationRejected,

    /// The payload verified but is not a well-formed event envelope.
    #[error("malformed webhook event: {0}")]
    MalformedEvent(String),

    #[error("assertion signing failed: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("remote API request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    #[error("failed to load settings: {0}")]
    Settings(#[from] config::ConfigError),

    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            GatewayError::AuthenticationRejected => {
                (StatusCode::UNAUTHORIZED, "Invalid webhook signature".to_string())
            }
            GatewayError::MalformedEvent(reason) => (StatusCode::BAD_REQUEST, reason.clone()),
            other => {
                log::error!("Request failed: {}", other);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
