//! Body codec collaborator
//!
//! Request and response bodies cross this seam as `serde_json::Value`, which
//! keeps the trait object-safe. The typed step — `Value` into the declared
//! return type — happens in the invoker via `serde_json::from_value`.

use bytes::Bytes;
use serde_json::Value;
use thiserror::Error;

/// Errors from encoding a request body or decoding a response body
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("failed to decode response body: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Trait for body codecs
pub trait BodyCodec: Send + Sync {
    /// Serialize a request body
    fn encode(&self, value: &Value) -> Result<Bytes, CodecError>;

    /// Parse a response body
    fn decode(&self, bytes: &[u8]) -> Result<Value, CodecError>;

    /// The content type attached to request bodies
    fn content_type(&self) -> &'static str {
        "application/json"
    }
}

/// JSON codec, the default
pub struct JsonCodec;

impl BodyCodec for JsonCodec {
    fn encode(&self, value: &Value) -> Result<Bytes, CodecError> {
        serde_json::to_vec(value)
            .map(Bytes::from)
            .map_err(CodecError::Encode)
    }

    fn decode(&self, bytes: &[u8]) -> Result<Value, CodecError> {
        serde_json::from_slice(bytes).map_err(CodecError::Decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn round_trips_json() {
        let codec = JsonCodec;
        let value = json!({"id": 42, "name": "widget"});

        let bytes = codec.encode(&value).unwrap();
        assert_eq!(codec.decode(&bytes).unwrap(), value);
    }

    #[test]
    fn empty_body_is_a_decode_error() {
        let err = JsonCodec.decode(b"").unwrap_err();
        assert!(matches!(err, CodecError::Decode(_)));
    }

    #[test]
    fn default_content_type_is_json() {
        assert_eq!(JsonCodec.content_type(), "application/json");
    }
}
