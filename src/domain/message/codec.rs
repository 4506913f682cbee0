//! JSON framing of Bayeux envelopes.
//!
//! Outgoing frames are always a JSON array. Incoming frames may be an
//! array of envelopes or a single envelope object.

use serde::Deserialize;
use serde_json::Value;

use super::envelope::Message;
use crate::domain::foundation::FayeError;

/// A decoded envelope together with the raw JSON it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundMessage {
    pub message: Message,
    raw: Value,
}

impl InboundMessage {
    /// The raw `data` member, if present and not null.
    pub fn data(&self) -> Option<&Value> {
        self.raw.get("data").filter(|data| !data.is_null())
    }

    /// The `data` member re-serialized as bytes for delivery.
    pub fn payload(&self) -> Option<Vec<u8>> {
        self.data().and_then(|data| serde_json::to_vec(data).ok())
    }
}

/// Serializes a batch of messages into one frame.
pub fn encode(messages: &[Message]) -> Result<Vec<u8>, FayeError> {
    Ok(serde_json::to_vec(messages)?)
}

/// Decodes one inbound frame.
///
/// # Errors
///
/// Returns `FayeError::DecodeFailure` if the bytes are not JSON, are not an
/// object or array of objects, or any envelope in the batch is malformed.
/// The whole batch is rejected in that case.
pub fn decode(bytes: &[u8]) -> Result<Vec<InboundMessage>, FayeError> {
    let value: Value = serde_json::from_slice(bytes)?;

    let raws = match value {
        Value::Array(items) => items,
        object @ Value::Object(_) => vec![object],
        other => {
            return Err(FayeError::DecodeFailure(format!(
                "expected an envelope or array of envelopes, got {}",
                kind_of(&other)
            )))
        }
    };

    raws.into_iter()
        .map(|raw| -> Result<InboundMessage, FayeError> {
            let message = Message::deserialize(&raw)?;
            Ok(InboundMessage { message, raw })
        })
        .collect()
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::message::MessageFactory;
    use serde_json::json;

    #[test]
    fn encodes_batches_as_arrays() {
        let handshake = MessageFactory::new("websocket").handshake();
        let bytes = encode(&[handshake]).unwrap();
        let value: Value = serde_json::from_slice(&bytes).unwrap();

        assert!(value.is_array());
        assert_eq!(value[0]["channel"], "/meta/handshake");
        assert_eq!(value[0]["supportedConnectionTypes"], json!(["websocket"]));
    }

    #[test]
    fn decodes_arrays_of_envelopes() {
        let frame = json!([
            {"channel": "/meta/connect", "successful": true, "clientId": "c1"},
            {"channel": "/foo/bar", "data": {"x": 1}}
        ]);
        let decoded = decode(frame.to_string().as_bytes()).unwrap();

        assert_eq!(decoded.len(), 2);
        assert!(decoded[0].data().is_none());
        assert_eq!(decoded[1].data(), Some(&json!({"x": 1})));
        assert_eq!(decoded[1].payload().unwrap(), br#"{"x":1}"#.to_vec());
    }

    #[test]
    fn decodes_single_envelope_object() {
        let decoded = decode(br#"{"channel": "/foo", "data": "hi"}"#).unwrap();
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0].payload().unwrap(), br#""hi""#.to_vec());
    }

    #[test]
    fn null_data_is_absent() {
        let decoded = decode(br#"[{"channel": "/foo", "data": null}]"#).unwrap();
        assert!(decoded[0].payload().is_none());
    }

    #[test]
    fn rejects_invalid_json() {
        assert!(matches!(
            decode(b"not json"),
            Err(FayeError::DecodeFailure(_))
        ));
    }

    #[test]
    fn rejects_scalars() {
        let err = decode(b"42").unwrap_err();
        assert!(err.to_string().contains("a number"));
    }

    #[test]
    fn one_bad_envelope_rejects_the_batch() {
        let frame = br#"[{"channel": "/foo"}, {"successful": true}]"#;
        assert!(decode(frame).is_err());
    }
}
