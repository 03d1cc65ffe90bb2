//! Codec trait and implementations for frame (de)serialization.
//!
//! The server never touches `serde_json` directly when talking to a
//! socket: it goes through a [`Codec`], so a binary format can be slotted
//! in later without touching the dispatcher.

use serde::{de::DeserializeOwned, Serialize};

use crate::{ProtocolError, ReplyFrame, RequestFrame};

/// Encodes values to bytes and decodes bytes back.
///
/// `Send + Sync + 'static` because one codec instance lives inside the
/// shared server state and is used from every connection task.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Encode`] if the value cannot be
    /// represented in this format.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Decode`] if the bytes are malformed or
    /// don't match `T`.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;

    /// Decodes one inbound request frame.
    fn decode_request(&self, data: &[u8]) -> Result<RequestFrame, ProtocolError> {
        self.decode(data)
    }

    /// Encodes one outbound reply frame.
    fn encode_reply(&self, reply: &ReplyFrame) -> Result<Vec<u8>, ProtocolError> {
        self.encode(reply)
    }
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] backed by `serde_json`.
///
/// Browser clients speak JSON natively, so this is the default.
///
/// ```rust
/// use cardclash_protocol::{Codec, JsonCodec, RequestFrame};
///
/// let codec = JsonCodec;
/// let frame: RequestFrame = codec
///     .decode(br#"{"id":1,"token":"t","call":"leaveRoom","data":{"roomId":"r1"}}"#)
///     .unwrap();
/// assert_eq!(frame.call, "leaveRoom");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ErrorCode, ReplyBody, WireError};

    #[test]
    fn test_decode_request_frame() {
        let bytes = br#"{"id":9,"token":"abc","call":"endTurn","data":{"roomId":"r","clientActionId":"a1"}}"#;
        let frame = JsonCodec.decode_request(bytes).unwrap();
        assert_eq!(frame.id, 9);
        assert_eq!(frame.token.as_deref(), Some("abc"));
        assert_eq!(frame.data["clientActionId"], "a1");
    }

    #[test]
    fn test_decode_request_without_data_defaults_to_null() {
        let frame = JsonCodec
            .decode_request(br#"{"id":1,"call":"findOrCreateRoom"}"#)
            .unwrap();
        assert!(frame.token.is_none());
        assert!(frame.data.is_null());
    }

    #[test]
    fn test_decode_garbage_fails() {
        let err = JsonCodec.decode_request(b"{not json").unwrap_err();
        assert!(matches!(err, ProtocolError::Decode(_)));
    }

    #[test]
    fn test_encode_error_reply_shape() {
        let reply = ReplyFrame {
            id: 4,
            body: ReplyBody::Error(WireError {
                code: ErrorCode::Aborted,
                message: "version mismatch".into(),
            }),
        };
        let bytes = JsonCodec.encode_reply(&reply).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["id"], 4);
        assert_eq!(json["error"]["code"], "aborted");
        assert!(json.get("ok").is_none());
    }
}
