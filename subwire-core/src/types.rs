//! JSON-RPC 2.0 envelopes as exchanged with a Substrate node
//!
//! Only the subset of the JSON-RPC 2.0 specification the client actually
//! uses is modeled here:
//!
//! 1. **Request**: a call to a remote method, carrying a numeric id
//! 2. **Response**: the result of a request, echoing the same id
//!
//! # Correlation ids
//!
//! JSON-RPC 2.0 permits string, numeric, and null ids. This client always
//! allocates numeric ids from a monotonic counter, so requests carry a bare
//! `u64`. Response ids are `Option<u64>`: a node pushes subscription
//! notifications on the same socket without an id, and those frames are
//! recognized by `id: None` and dropped (subscriptions are not supported).

use serde::{Deserialize, Serialize};

/// JSON-RPC 2.0 request envelope
///
/// A request represents a call to a remote method that expects a response.
/// The response will carry a matching `id` field.
///
/// Substrate methods take positional parameters, so `params` is always an
/// array - empty when the method takes none (`system_chain`,
/// `state_getMetadata`, ...).
///
/// # Examples
///
/// ```rust
/// use subwire_core::RpcRequest;
/// use serde_json::json;
///
/// let req = RpcRequest::new(7, "system_accountNextIndex", vec![json!("5Grw...")]);
/// assert_eq!(req.jsonrpc, "2.0");
/// assert_eq!(req.id, 7);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcRequest {
    /// Protocol version - always "2.0"
    pub jsonrpc: String,
    /// Correlation id, unique among requests currently in flight
    pub id: u64,
    /// Name of the remote method to invoke
    pub method: String,
    /// Positional parameters, in the order the method defines
    pub params: Vec<serde_json::Value>,
}

impl RpcRequest {
    /// Create a new JSON-RPC 2.0 request
    ///
    /// The `jsonrpc` field is set to "2.0" automatically.
    pub fn new(id: u64, method: impl Into<String>, params: Vec<serde_json::Value>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            method: method.into(),
            params,
        }
    }
}

/// JSON-RPC 2.0 response envelope
///
/// A response carries either a `result` (success) or an `error` (failure),
/// never both. The `error` member is kept as a raw [`serde_json::Value`] so
/// the server payload reaches the caller verbatim - nodes are not entirely
/// consistent about the error object shape.
///
/// # Notifications
///
/// A frame without an id is a server-initiated notification, not the answer
/// to any call. [`RpcResponse::is_notification`] identifies those; the
/// client discards them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcResponse {
    /// Protocol version - always "2.0"
    pub jsonrpc: String,
    /// Correlation id from the originating request; absent on notifications
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    /// The result of the method invocation (present only on success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    /// Error payload (present only on failure), kept verbatim
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<serde_json::Value>,
}

impl RpcResponse {
    /// Build a successful response (used by tests and fakes)
    pub fn success(id: u64, result: serde_json::Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: Some(id),
            result: Some(result),
            error: None,
        }
    }

    /// Build an error response (used by tests and fakes)
    pub fn failure(id: u64, error: serde_json::Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: Some(id),
            result: None,
            error: Some(error),
        }
    }

    /// True when the server reported an error for this call
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// True when this frame carries no correlation id
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}
