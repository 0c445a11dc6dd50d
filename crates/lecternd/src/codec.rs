//! Envelope codec for the stdio boundary.
//!
//! Every message crossing the boundary is a single JSON line of the form
//! `{"type": ..., "id": ..., "payload": ...}`. Decoding is all or nothing: a
//! line either yields a complete [`Envelope`] or a [`CodecError`], and codec
//! failures are never attributed to a request id.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Caller-assigned correlation identifier, echoed verbatim in replies.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    /// Numeric identifier.
    Number(serde_json::Number),
    /// String identifier.
    Text(String),
}

impl From<u64> for RequestId {
    fn from(value: u64) -> Self {
        Self::Number(value.into())
    }
}

impl From<&str> for RequestId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(number) => write!(f, "{number}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

/// Request or reply wrapper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Job type for requests, `"<type>:done"` or `"<type>:failed"` for replies.
    #[serde(rename = "type")]
    pub kind: String,
    /// Correlation identifier.
    pub id: RequestId,
    /// Message body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

impl Envelope {
    /// Creates an envelope; a `null` payload is omitted on the wire.
    pub fn new(kind: impl Into<String>, id: RequestId, payload: Value) -> Self {
        Self {
            kind: kind.into(),
            id,
            payload: (!payload.is_null()).then_some(payload),
        }
    }

    /// Creates a `"<kind>:done"` reply.
    pub fn done(kind: &str, id: RequestId, payload: Value) -> Self {
        Self::new(format!("{kind}:done"), id, payload)
    }

    /// Creates a `"<kind>:failed"` reply.
    pub fn failed(kind: &str, id: RequestId, payload: Value) -> Self {
        Self::new(format!("{kind}:failed"), id, payload)
    }
}

/// Errors raised while decoding or encoding envelopes and payloads.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The line held nothing but whitespace.
    #[error("empty envelope line")]
    Empty,

    /// The line exceeded the configured limit.
    #[error("envelope too large: {size} bytes exceeds {max_size} byte limit")]
    TooLarge {
        /// Observed size in bytes.
        size: usize,
        /// Configured limit in bytes.
        max_size: usize,
    },

    /// The line was not a valid envelope.
    #[error("malformed envelope: {source}")]
    Malformed {
        /// Parser error.
        #[source]
        source: serde_json::Error,
    },

    /// A payload did not have the shape the job expects.
    #[error("unexpected payload shape: {source}")]
    Shape {
        /// Deserialisation error.
        #[source]
        source: serde_json::Error,
    },

    /// A value could not be serialised.
    #[error("failed to encode: {source}")]
    Encode {
        /// Serialisation error.
        #[source]
        source: serde_json::Error,
    },
}

impl CodecError {
    /// Creates a size limit error.
    pub fn too_large(size: usize, max_size: usize) -> Self {
        Self::TooLarge { size, max_size }
    }
}

/// Decodes one inbound line, enforcing `max_size` on the trimmed line.
///
/// # Errors
///
/// Returns [`CodecError::Empty`], [`CodecError::TooLarge`] or
/// [`CodecError::Malformed`].
pub fn decode_envelope(line: &[u8], max_size: usize) -> Result<Envelope, CodecError> {
    let trimmed = line.trim_ascii();
    if trimmed.is_empty() {
        return Err(CodecError::Empty);
    }
    if trimmed.len() > max_size {
        return Err(CodecError::too_large(trimmed.len(), max_size));
    }
    serde_json::from_slice(trimmed).map_err(|source| CodecError::Malformed { source })
}

/// Encodes an envelope as a single line without the trailing newline.
///
/// # Errors
///
/// Returns [`CodecError::Encode`] if serialisation fails.
pub fn encode_envelope(envelope: &Envelope) -> Result<String, CodecError> {
    serde_json::to_string(envelope).map_err(|source| CodecError::Encode { source })
}

/// Decodes a job payload; an absent or `null` payload reads as `{}`.
///
/// # Errors
///
/// Returns [`CodecError::Shape`] when the payload does not match `T`.
pub fn decode_payload<T: DeserializeOwned>(payload: &Value) -> Result<T, CodecError> {
    let result = if payload.is_null() {
        serde_json::from_value(Value::Object(Map::new()))
    } else {
        T::deserialize(payload)
    };
    result.map_err(|source| CodecError::Shape { source })
}

/// Encodes a reply payload.
///
/// # Errors
///
/// Returns [`CodecError::Encode`] if serialisation fails.
pub fn encode_payload<T: Serialize>(value: &T) -> Result<Value, CodecError> {
    serde_json::to_value(value).map_err(|source| CodecError::Encode { source })
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    const LIMIT: usize = 1024;

    #[test]
    fn decodes_minimal_envelope() {
        let envelope =
            decode_envelope(br#"{"type":"analyze","id":7}"#, LIMIT).expect("decode envelope");
        assert_eq!(envelope.kind, "analyze");
        assert_eq!(envelope.id, RequestId::from(7));
        assert_eq!(envelope.payload, None);
    }

    #[test]
    fn string_ids_are_kept_verbatim() {
        let envelope = decode_envelope(br#"{"type":"x","id":"req-1","payload":{}}"#, LIMIT)
            .expect("decode envelope");
        assert_eq!(envelope.id, RequestId::from("req-1"));
        let line = encode_envelope(&Envelope::done("x", envelope.id, json!({}))).expect("encode");
        assert!(line.contains(r#""id":"req-1""#), "line: {line}");
    }

    #[test]
    fn trailing_newline_is_ignored() {
        assert!(decode_envelope(b"{\"type\":\"x\",\"id\":1}\r\n", LIMIT).is_ok());
    }

    #[rstest]
    #[case::empty(b"".as_slice())]
    #[case::blank(b"  \n".as_slice())]
    fn rejects_empty_lines(#[case] line: &[u8]) {
        assert!(matches!(decode_envelope(line, LIMIT), Err(CodecError::Empty)));
    }

    #[rstest]
    #[case::not_json(b"not json".as_slice())]
    #[case::missing_id(br#"{"type":"analyze"}"#.as_slice())]
    #[case::missing_type(br#"{"id":1}"#.as_slice())]
    #[case::object_id(br#"{"type":"analyze","id":{}}"#.as_slice())]
    fn rejects_malformed_envelopes(#[case] line: &[u8]) {
        assert!(matches!(
            decode_envelope(line, LIMIT),
            Err(CodecError::Malformed { .. })
        ));
    }

    #[test]
    fn rejects_oversize_lines() {
        let line = format!(r#"{{"type":"x","id":1,"payload":"{}"}}"#, "a".repeat(LIMIT));
        assert!(matches!(
            decode_envelope(line.as_bytes(), LIMIT),
            Err(CodecError::TooLarge { max_size: LIMIT, .. })
        ));
    }

    #[test]
    fn null_payload_is_omitted_from_replies() {
        let line = encode_envelope(&Envelope::done("initialize", 3.into(), Value::Null))
            .expect("encode");
        assert_eq!(line, r#"{"type":"initialize:done","id":3}"#);
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Probe {
        #[serde(default)]
        name: String,
    }

    #[test]
    fn absent_payload_decodes_as_empty_object() {
        let probe: Probe = decode_payload(&Value::Null).expect("decode null");
        assert_eq!(probe, Probe { name: String::new() });
    }

    #[test]
    fn wrong_payload_shape_is_reported() {
        let result: Result<Probe, _> = decode_payload(&json!({"name": 42}));
        assert!(matches!(result, Err(CodecError::Shape { .. })));
    }

    #[test]
    fn produced_values_survive_the_boundary() {
        let reply = Envelope::failed(
            "analyze",
            RequestId::from("a"),
            json!({"error": "boom", "supersededBy": 4}),
        );
        let line = encode_envelope(&reply).expect("encode");
        assert_eq!(decode_envelope(line.as_bytes(), LIMIT).expect("decode"), reply);
    }
}
