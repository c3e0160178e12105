// src/services/event_gate.rs
//! Webhook entry gate and event dispatch.
//!
//! Every inbound delivery moves through a fixed sequence:
//!
//! ```text
//! RECEIVED -> verify -> REJECTED                        (401, terminal)
//!                    -> VERIFIED -> parse -> dispatch -> processed | unknown_event
//! ```
//!
//! The body is parsed only after its signature checks out, and always from
//! the bytes as received. Routing is an exact-match table keyed by
//! [`EventType`]; tags with no handler are acknowledged as unknown.

use crate::auth::signature_verifier::SignatureVerifier;
use crate::errors::GatewayError;
use crate::models::webhook::{Acknowledgement, EventType, WebhookEvent};
use std::collections::HashMap;
use std::sync::Arc;

/// Header carrying the hex HMAC-SHA256 of the raw body.
pub const SIGNATURE_HEADER: &str = "x-revolut-signature";

/// Business-logic hook for one event type.
///
/// Handlers receive events that have already been authenticated. Delivery
/// may be duplicated or reordered by the sender; idempotency is the
/// handler's concern.
pub trait EventHandler: Send + Sync {
    fn handle(&self, event: &WebhookEvent) -> Result<Acknowledgement, GatewayError>;
}

/// Built-in handler for `TransactionCreated`.
pub struct TransactionCreatedHandler;

impl EventHandler for TransactionCreatedHandler {
    fn handle(&self, event: &WebhookEvent) -> Result<Acknowledgement, GatewayError> {
        log::info!("Transaction created: {}", display_field(event, "id"));
        Ok(Acknowledgement::processed(&EventType::TransactionCreated)
            .with_detail("transactionId", event.data_field("id")))
    }
}

/// Built-in handler for `TransactionStateChanged`.
pub struct TransactionStateChangedHandler;

impl EventHandler for TransactionStateChangedHandler {
    fn handle(&self, event: &WebhookEvent) -> Result<Acknowledgement, GatewayError> {
        log::info!(
            "Transaction state changed: {} - {}",
            display_field(event, "id"),
            display_field(event, "state")
        );
        Ok(Acknowledgement::processed(&EventType::TransactionStateChanged)
            .with_detail("transactionId", event.data_field("id"))
            .with_detail("newState", event.data_field("state")))
    }
}

/// Built-in handler for `PaymentCreated`.
pub struct PaymentCreatedHandler;

impl EventHandler for PaymentCreatedHandler {
    fn handle(&self, event: &WebhookEvent) -> Result<Acknowledgement, GatewayError> {
        log::info!("Payment created: {}", display_field(event, "id"));
        Ok(Acknowledgement::processed(&EventType::PaymentCreated)
            .with_detail("paymentId", event.data_field("id")))
    }
}

/// Built-in handler for `PaymentStateChanged`.
pub struct PaymentStateChangedHandler;

impl EventHandler for PaymentStateChangedHandler {
    fn handle(&self, event: &WebhookEvent) -> Result<Acknowledgement, GatewayError> {
        log::info!(
            "Payment state changed: {} - {}",
            display_field(event, "id"),
            display_field(event, "state")
        );
        Ok(Acknowledgement::processed(&EventType::PaymentStateChanged)
            .with_detail("paymentId", event.data_field("id"))
            .with_detail("newState", event.data_field("state")))
    }
}

fn display_field(event: &WebhookEvent, name: &str) -> String {
    match event.data_field(name) {
        Some(serde_json::Value::String(value)) => value.clone(),
        Some(other) => other.to_string(),
        None => "<none>".to_string(),
    }
}

/// Routes verified events to subscribed handlers by tag.
#[derive(Clone, Default)]
pub struct EventDispatcher {
    handlers: HashMap<EventType, Arc<dyn EventHandler>>,
}

impl EventDispatcher {
    /// A dispatcher with no handlers; every event is acknowledged as unknown.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A dispatcher with the built-in handler for each recognized tag.
    pub fn with_default_handlers() -> Self {
        let mut dispatcher = Self::empty();
        dispatcher.subscribe(EventType::TransactionCreated, Arc::new(TransactionCreatedHandler));
        dispatcher.subscribe(
            EventType::TransactionStateChanged,
            Arc::new(TransactionStateChangedHandler),
        );
        dispatcher.subscribe(EventType::PaymentCreated, Arc::new(PaymentCreatedHandler));
        dispatcher.subscribe(EventType::PaymentStateChanged, Arc::new(PaymentStateChangedHandler));
        dispatcher
    }

    /// Registers `handler` for `event_type`, replacing any previous one.
    pub fn subscribe(&mut self, event_type: EventType, handler: Arc<dyn EventHandler>) {
        self.handlers.insert(event_type, handler);
    }

    /// Tags that currently have a handler.
    pub fn supported_events(&self) -> Vec<String> {
        let mut tags: Vec<String> = self.handlers.keys().map(|t| t.to_string()).collect();
        tags.sort();
        tags
    }

    pub fn dispatch(&self, event: &WebhookEvent) -> Result<Acknowledgement, GatewayError> {
        log::info!("Processing webhook event: {}", event.event);

        match self.handlers.get(&event.event_type()) {
            Some(handler) => handler.handle(event).map_err(|e| {
                log::error!("Error processing webhook {}: {}", event.event, e);
                e
            }),
            None => {
                log::warn!("Unknown event type: {}", event.event);
                Ok(Acknowledgement::unknown(&event.event))
            }
        }
    }
}

/// Verifies inbound webhooks and hands them to the dispatcher.
#[derive(Clone)]
pub struct EventGate {
    verifier: SignatureVerifier,
    dispatcher: EventDispatcher,
}

impl EventGate {
    pub fn new(verifier: SignatureVerifier, dispatcher: EventDispatcher) -> Self {
        EventGate {
            verifier,
            dispatcher,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.verifier.is_configured()
    }

    pub fn supported_events(&self) -> Vec<String> {
        self.dispatcher.supported_events()
    }

    /// Authenticates and dispatches one delivery.
    ///
    /// # Arguments
    /// * `raw_body` - Request body exactly as received
    /// * `signature_header` - Value of `X-Revolut-Signature`, if present
    ///
    /// # Errors
    /// - [`GatewayError::AuthenticationRejected`] on a missing or wrong signature
    /// - [`GatewayError::MalformedEvent`] if a verified body is not an event envelope
    pub fn handle(
        &self,
        raw_body: &[u8],
        signature_header: Option<&str>,
    ) -> Result<Acknowledgement, GatewayError> {
        let signature = signature_header.unwrap_or_default();
        if !self.verifier.verify(raw_body, signature) {
            log::warn!("Webhook signature verification failed");
            return Err(GatewayError::AuthenticationRejected);
        }

        let event: WebhookEvent = serde_json::from_slice(raw_body)
            .map_err(|e| GatewayError::MalformedEvent(format!("invalid event payload: {}", e)))?;

        self.dispatcher.dispatch(&event)
    }
}
