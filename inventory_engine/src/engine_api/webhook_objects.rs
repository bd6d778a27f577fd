use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::{db_types::Order, helpers::SignatureError, traits::InventoryError};

/// The only event kind that changes order state.
pub const PAYMENT_SUCCEEDED: &str = "payment.succeeded";

/// A payment notification, as sent by the payment provider.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentEvent {
    /// Normally a string. Any other JSON value is kept so the event can still be acknowledged and ignored.
    #[serde(default)]
    pub event: Option<Value>,
    /// An integer, or a string holding one
    #[serde(default)]
    pub order_id: Option<Value>,
}

impl PaymentEvent {
    /// Parses an event from the raw request body. The body must be a JSON object.
    pub fn from_slice(raw: &[u8]) -> Result<Self, WebhookError> {
        let value: Value =
            serde_json::from_slice(raw).map_err(|e| WebhookError::MalformedPayload(format!("Invalid JSON. {e}")))?;
        if !value.is_object() {
            return Err(WebhookError::MalformedPayload("The event must be a JSON object".into()));
        }
        serde_json::from_value(value).map_err(|e| WebhookError::MalformedPayload(e.to_string()))
    }

    pub fn is_payment_succeeded(&self) -> bool {
        self.event.as_ref().and_then(Value::as_str) == Some(PAYMENT_SUCCEEDED)
    }

    /// The event kind as text. Non-string kinds are rendered as their JSON.
    pub fn event_name(&self) -> Option<String> {
        self.event.as_ref().map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }

    pub fn order_id(&self) -> Result<i64, WebhookError> {
        let value = self.order_id.as_ref().ok_or_else(|| WebhookError::MalformedPayload("order_id is missing".into()))?;
        let id = match value {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        };
        id.ok_or_else(|| WebhookError::MalformedPayload(format!("order_id is not an integer: {value}")))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// The event was authentic, but is not one that the inventory acts on.
    Ignored { event: Option<String> },
    /// The order is paid. `newly_paid` is false for repeat deliveries of the same payment.
    Processed { order: Order, newly_paid: bool },
}

#[derive(Debug, Clone, Error)]
pub enum WebhookError {
    #[error("Missing signature")]
    MissingSignature,
    #[error("Invalid signature")]
    InvalidSignature,
    #[error("Malformed payload. {0}")]
    MalformedPayload(String),
    #[error("Cannot check signatures. {0}")]
    SignatureError(#[from] SignatureError),
    #[error(transparent)]
    InventoryError(#[from] InventoryError),
}
