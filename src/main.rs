// src/main.rs

//! # Revolut Gateway - Main Entry Point
//!
//! Loads configuration, builds the outbound and inbound authentication
//! components, and starts the API server.
//!
//! ## Environment Variables
//! - `REVOLUT_CLIENT_ID`: Client identifier registered with Revolut
//! - `REVOLUT_PRIVATE_KEY` / `REVOLUT_PRIVATE_KEY_PATH`: RSA signing key (optional; unauthenticated without it)
//! - `WEBHOOK_SECRET`: Webhook shared secret (optional; all webhooks rejected without it)
//! - `RUST_LOG`: (Optional) log filter (default: info)
//!
//! See [`revolut_gateway::settings`] for the full list.

use anyhow::Context;
use revolut_gateway::settings::Settings;
use revolut_gateway::services::api_server::ApiServer;
use revolut_gateway::{
    AssertionIssuer, EventDispatcher, EventGate, RequestAuthenticator, RevolutClient,
    SignatureVerifier,
};
use std::net::SocketAddr;
use std::sync::Arc;

/// Main application entry point
///
/// # Initialization Sequence
/// 1. Load environment configuration
/// 2. Load signing key and webhook secret
/// 3. Initialize service components
/// 4. Start API server
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("failed to load settings")?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Outbound: assertion issuer behind a caching authenticator
    let issuer = AssertionIssuer::from_settings(&settings).context("invalid signing key")?;
    let authenticator = Arc::new(RequestAuthenticator::new(
        issuer,
        settings.revolut_token_refresh_margin_secs,
    ));
    let revolut_client = RevolutClient::from_settings(&settings, authenticator)
        .context("failed to build Revolut API client")?;

    // Inbound: signature verification in front of the event dispatcher
    let verifier = SignatureVerifier::from_settings(&settings);
    if !verifier.is_configured() {
        log::warn!("WEBHOOK_SECRET not set; all webhook deliveries will be rejected");
    }
    let event_gate = EventGate::new(verifier, EventDispatcher::with_default_handlers());

    let api_server = ApiServer::new(event_gate, revolut_client, settings.cors_origin.clone());

    let addr: SocketAddr = format!("{}:{}", settings.host, settings.port)
        .parse()
        .context("HOST/PORT do not form a valid socket address")?;
    log::info!("Available endpoints:");
    log::info!("- POST /api/webhooks/revolut");
    log::info!("- GET  /api/webhooks/info");
    log::info!("- GET  /api/health");

    api_server.run(addr).await?;
    Ok(())
}
