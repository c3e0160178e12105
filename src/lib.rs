// src/lib.rs

//! # Revolut Gateway
//!
//! Trust boundary between this service and the Revolut Business API.
//!
//! ## Architecture Overview
//! 1. **Auth Layer**: client assertion signing (outbound) and webhook signature verification (inbound)
//! 2. **Services Layer**: authenticated API client, webhook gate/dispatcher and HTTP endpoints
//! 3. **Models**: assertion and webhook event data structures
//! 4. **Config**: environment-driven settings loaded once at startup

pub mod auth;       // Assertion issuance, request signing, webhook verification
pub mod settings;   // Environment-driven configuration
pub mod errors;     // Error taxonomy
pub mod models;     // Data structures
pub mod services;   // Remote client, event gate and API server
pub mod utils;      // Helper functions

pub use auth::assertion_issuer::AssertionIssuer;
pub use auth::request_authenticator::RequestAuthenticator;
pub use auth::signature_verifier::SignatureVerifier;
pub use errors::GatewayError;
pub use services::event_gate::{EventDispatcher, EventGate, EventHandler};
pub use services::revolut_client::RevolutClient;
