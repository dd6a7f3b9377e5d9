//! Codec for JSON-RPC text frames
//!
//! Thin wrappers over serde_json that map failures onto the subwire error
//! taxonomy. Outgoing requests can only fail with `Serialization` (a bug in
//! the caller's params); incoming frames fail with `Decode`, which the
//! dispatcher recovers from locally.

use crate::error::{Error, Result};
use crate::types::{RpcRequest, RpcResponse};

/// Encode a request envelope into a text frame
pub fn encode_request(req: &RpcRequest) -> Result<String> {
    serde_json::to_string(req).map_err(|e| Error::Serialization(e.to_string()))
}

/// Decode a text frame into a response envelope
///
/// Frames that are valid JSON-RPC but carry no id (subscription
/// notifications) decode successfully with `id: None`; the caller decides
/// what to do with them. Anything that is not a JSON-RPC frame at all is a
/// `Decode` error.
pub fn decode_response(frame: &str) -> Result<RpcResponse> {
    serde_json::from_str(frame).map_err(|e| Error::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn encode_request_wire_shape() {
        let req = RpcRequest::new(3, "state_getStorage", vec![json!("0x00")]);
        let frame = encode_request(&req).unwrap();
        assert!(frame.contains("\"jsonrpc\":\"2.0\""));
        assert!(frame.contains("\"id\":3"));
        assert!(frame.contains("\"params\":[\"0x00\"]"));
    }

    #[test]
    fn decode_success_response() {
        let resp = decode_response(r#"{"jsonrpc":"2.0","id":1,"result":"Development"}"#).unwrap();
        assert_eq!(resp.id, Some(1));
        assert_eq!(resp.result, Some(json!("Development")));
        assert!(resp.error.is_none());
    }

    #[test]
    fn decode_error_response() {
        let resp = decode_response(
            r#"{"jsonrpc":"2.0","id":2,"error":{"code":-32601,"message":"Method not found"}}"#,
        )
        .unwrap();
        assert!(resp.is_error());
        assert_eq!(resp.id, Some(2));
    }

    #[test]
    fn decode_notification_frame() {
        let resp = decode_response(
            r#"{"jsonrpc":"2.0","method":"state_storage","params":{"subscription":"abc"}}"#,
        )
        .unwrap();
        assert!(resp.is_notification());
    }

    #[test]
    fn decode_garbage_is_decode_error() {
        match decode_response("not json at all") {
            Err(Error::Decode(_)) => {}
            other => panic!("expected Decode error, got {other:?}"),
        }
    }

    #[test]
    fn decode_non_rpc_object_is_decode_error() {
        // valid JSON but missing the jsonrpc member
        assert!(decode_response(r#"{"foo": 1}"#).is_err());
    }
}
