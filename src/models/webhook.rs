// src/models/webhook.rs
//! Inbound webhook event model.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Event-type tag sent by the remote party.
///
/// The set is open: tags this build does not know about parse into
/// [`EventType::Other`] and are acknowledged as unknown rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventType {
    TransactionCreated,
    TransactionStateChanged,
    PaymentCreated,
    PaymentStateChanged,
    Other(String),
}

impl EventType {
    /// Tags with a built-in handler.
    pub const RECOGNIZED: [EventType; 4] = [
        EventType::TransactionCreated,
        EventType::TransactionStateChanged,
        EventType::PaymentCreated,
        EventType::PaymentStateChanged,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            EventType::TransactionCreated => "TransactionCreated",
            EventType::TransactionStateChanged => "TransactionStateChanged",
            EventType::PaymentCreated => "PaymentCreated",
            EventType::PaymentStateChanged => "PaymentStateChanged",
            EventType::Other(tag) => tag,
        }
    }
}

impl FromStr for EventType {
    type Err = std::convert::Infallible;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        Ok(match tag {
            "TransactionCreated" => EventType::TransactionCreated,
            "TransactionStateChanged" => EventType::TransactionStateChanged,
            "PaymentCreated" => EventType::PaymentCreated,
            "PaymentStateChanged" => EventType::PaymentStateChanged,
            other => EventType::Other(other.to_string()),
        })
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parsed webhook body.
///
/// Only ever constructed from bytes whose signature has already been checked.
#[derive(Deserialize, Debug, Clone)]
pub struct WebhookEvent {
    /// Raw tag, e.g. "TransactionCreated"
    #[serde(alias = "type")]
    pub event: String,

    /// Event payload, forwarded to handlers untouched
    #[serde(default = "empty_object")]
    pub data: Value,
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

impl WebhookEvent {
    pub fn event_type(&self) -> EventType {
        match self.event.parse() {
            Ok(event_type) => event_type,
            Err(never) => match never {},
        }
    }

    /// Looks up a top-level field of `data`, ignoring JSON nulls.
    pub fn data_field(&self, name: &str) -> Option<&Value> {
        self.data.get(name).filter(|value| !value.is_null())
    }
}

/// Outcome reported for a dispatched event.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AckStatus {
    Processed,
    UnknownEvent,
}

/// Structured acknowledgement returned to the webhook sender.
///
/// Serializes flat, e.g.
/// `{"status":"processed","event":"TransactionCreated","transactionId":"tx_1"}`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Acknowledgement {
    pub status: AckStatus,
    pub event: String,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl Acknowledgement {
    pub fn processed(event: &EventType) -> Self {
        Acknowledgement {
            status: AckStatus::Processed,
            event: event.to_string(),
            details: Map::new(),
        }
    }

    pub fn unknown(tag: &str) -> Self {
        Acknowledgement {
            status: AckStatus::UnknownEvent,
            event: tag.to_string(),
            details: Map::new(),
        }
    }

    /// Adds an identifying field; `None` leaves the acknowledgement unchanged.
    pub fn with_detail(mut self, key: &str, value: Option<&Value>) -> Self {
        if let Some(value) = value {
            self.details.insert(key.to_string(), value.clone());
        }
        self
    }
}
