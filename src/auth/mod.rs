// src/auth/mod.rs
//! Both directions of the trust boundary with the remote API.
//!
//! - Outbound: [`assertion_issuer`] mints signed client assertions and
//!   [`request_authenticator`] attaches them to requests.
//! - Inbound: [`signature_verifier`] checks webhook HMAC signatures.

pub mod assertion_issuer;
pub mod key_management;
pub mod request_authenticator;
pub mod signature_verifier;
