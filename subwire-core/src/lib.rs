//! Core JSON-RPC 2.0 wire types and codec for subwire
//!
//! This crate provides the foundation the client builds on:
//!
//! - **Types**: the request/response envelopes exchanged with a node
//! - **Codec**: encoding and decoding of text frames
//! - **Error handling**: the error taxonomy shared across the workspace
//!
//! # Overview
//!
//! Substrate nodes speak JSON-RPC 2.0 over a WebSocket: every call is a
//! request object carrying a correlation id, and every answer is a response
//! object echoing that id. This crate is transport-agnostic - it defines the
//! envelopes and their JSON encoding but says nothing about sockets. The
//! `subwire-client` crate supplies the transport and the connection
//! lifecycle on top of this foundation.
//!
//! # Example
//!
//! ```rust
//! use subwire_core::{codec, RpcRequest};
//!
//! let request = RpcRequest::new(1, "system_chain", vec![]);
//! let frame = codec::encode_request(&request).unwrap();
//!
//! let response = codec::decode_response(r#"{"jsonrpc":"2.0","id":1,"result":"Development"}"#).unwrap();
//! assert_eq!(response.id, Some(1));
//! ```

pub mod codec;
pub mod error;
pub mod types;

// Re-export the most commonly used items so users can write
// `subwire_core::Error` instead of `subwire_core::error::Error`.
pub use error::{Error, Result};
pub use types::{RpcRequest, RpcResponse};
