//! Error taxonomy for subwire
//!
//! A single `Error` enum covers every failure the client can surface. Two
//! kinds of errors exist with very different propagation rules:
//!
//! - **Connection-scoped**: `Connection` drives the global connection state
//!   and the reconnection machinery.
//! - **Call-scoped**: `Timeout`, `Rpc`, `NotConnected`, `Cancelled` and
//!   `Serialization` surface only to the caller that awaited the failing
//!   call; they never change the connection state.
//!
//! `Decode` is recovered locally by the dispatcher - one malformed frame is
//! logged and skipped, it neither kills the read loop nor fails any call.
//!
//! The enum is `Clone` so that a disconnect can fan a single cancellation
//! error out to every pending caller.

use thiserror::Error;

/// Result type for subwire operations
pub type Result<T> = std::result::Result<T, Error>;

/// All error conditions surfaced by the client
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// Handshake or transport failure; the message is the raw failure text
    /// from the transport (DNS, refused connection, TLS, HTTP upgrade)
    #[error("connection failed: {0}")]
    Connection(String),

    /// The call exceeded its deadline and was abandoned
    #[error("request timed out")]
    Timeout,

    /// The server answered with an `error` member; the payload is verbatim
    #[error("server returned an error: {0}")]
    Rpc(serde_json::Value),

    /// A call was issued while no session is active
    #[error("not connected")]
    NotConnected,

    /// The pending call was resolved by a disconnect or client teardown
    #[error("call cancelled: {0}")]
    Cancelled(String),

    /// A frame could not be decoded; recovered locally, never fatal
    #[error("undecodable frame: {0}")]
    Decode(String),

    /// Parameters or a result could not be (de)serialized
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// True for errors that indicate the connection itself is unusable
    pub fn is_connection_error(&self) -> bool {
        matches!(self, Error::Connection(_))
    }
}
