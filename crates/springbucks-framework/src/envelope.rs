//! # Messages and Envelopes
//!
//! A [`Message<P>`] is what application code builds and consumes: a typed
//! payload plus string headers. An [`Envelope`] is what travels through the
//! bridge: the same headers with the payload encoded as JSON, so one bridge
//! can carry bindings with different payload types.

use crate::error::FrameworkError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Typed message with headers.
///
/// ```rust
/// use springbucks_framework::Message;
///
/// let message = Message::with_payload(42u64).header("customer", "Alice");
/// assert_eq!(message.payload, 42);
/// assert_eq!(message.header_value("customer"), Some("Alice"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Message<P> {
    pub payload: P,
    pub headers: BTreeMap<String, String>,
}

impl<P> Message<P> {
    pub fn with_payload(payload: P) -> Self {
        Self {
            payload,
            headers: BTreeMap::new(),
        }
    }

    /// Sets a header, replacing any previous value.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }
}

impl<P: Serialize> Message<P> {
    /// Encodes the payload for transport on `binding`.
    pub fn into_envelope(self, binding: &str) -> Result<Envelope, FrameworkError> {
        let payload =
            serde_json::to_value(&self.payload).map_err(|e| FrameworkError::codec(binding, e))?;
        Ok(Envelope {
            payload,
            headers: self.headers,
        })
    }
}

/// Wire form of a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub payload: serde_json::Value,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

impl Envelope {
    /// Decodes the payload into `P`. `binding` is only used for the error.
    pub fn decode<P: DeserializeOwned>(&self, binding: &str) -> Result<Message<P>, FrameworkError> {
        let payload = serde_json::from_value(self.payload.clone())
            .map_err(|e| FrameworkError::codec(binding, e))?;
        Ok(Message {
            payload,
            headers: self.headers.clone(),
        })
    }

    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_keeps_headers_and_payload() {
        let envelope = Message::with_payload(7u64)
            .header("customer", "Bob")
            .into_envelope("notifyOrders-out-0")
            .unwrap();

        assert_eq!(envelope.payload, serde_json::json!(7));
        assert_eq!(envelope.header_value("customer"), Some("Bob"));

        let decoded: Message<u64> = envelope.decode("notifyOrders-out-0").unwrap();
        assert_eq!(decoded.payload, 7);
        assert_eq!(decoded.header_value("customer"), Some("Bob"));
    }

    #[test]
    fn test_decode_wrong_payload_type_is_codec_error() {
        let envelope = Envelope {
            payload: serde_json::json!("not-a-number"),
            headers: BTreeMap::new(),
        };

        let result = envelope.decode::<u64>("finishedOrders");
        match result {
            Err(FrameworkError::Codec { binding, .. }) => assert_eq!(binding, "finishedOrders"),
            other => panic!("Expected codec error, got {:?}", other),
        }
    }

    #[test]
    fn test_header_replaces_previous_value() {
        let message = Message::with_payload(())
            .header("customer", "Alice")
            .header("customer", "Carol");
        assert_eq!(message.header_value("customer"), Some("Carol"));
        assert_eq!(message.headers.len(), 1);
    }
}
