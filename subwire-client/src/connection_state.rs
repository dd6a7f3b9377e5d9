//! Connection state machine
//!
//! Tracks where the client is in its connection lifecycle and publishes
//! every transition to subscribers.
//!
//! # States
//!
//! ```text
//! Disconnected → Connecting → Connected
//!        ↑            ↓           ↓
//!        └──────── Error ←────────┘
//! ```
//!
//! - **Disconnected**: initial state, and the result of an explicit
//!   `disconnect()` from anywhere
//! - **Connecting**: a handshake (initial or retry) is in progress
//! - **Connected**: the session is live
//! - **Error**: the handshake failed or the read loop died; carries the
//!   failure message
//!
//! # Delivery guarantees
//!
//! A new subscriber first receives the current state, then every subsequent
//! transition in occurrence order. Each subscriber gets its own unbounded
//! channel, so a slow consumer sees a complete, ordered history rather than
//! a coalesced snapshot.

use std::sync::Mutex;
use tokio::sync::mpsc;

/// Where the client currently is in its connection lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    /// Not connected and not trying to be
    Disconnected,
    /// Handshake in progress
    Connecting,
    /// Session live, calls may be issued
    Connected,
    /// Something failed; the payload is the failure message
    Error(String),
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected)
    }
}

struct Inner {
    current: ConnectionState,
    subscribers: Vec<mpsc::UnboundedSender<ConnectionState>>,
}

/// Holds the current state and fans transitions out to subscribers.
pub struct ConnectionStateMachine {
    inner: Mutex<Inner>,
}

impl ConnectionStateMachine {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                current: ConnectionState::Disconnected,
                subscribers: Vec::new(),
            }),
        }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> ConnectionState {
        self.inner.lock().unwrap().current.clone()
    }

    /// Move to `next` and deliver it to every live subscriber.
    ///
    /// Subscribers whose receiver has been dropped are pruned here.
    pub fn transition(&self, next: ConnectionState) {
        let mut inner = self.inner.lock().unwrap();
        tracing::debug!(from = ?inner.current, to = ?next, "connection state transition");
        inner.current = next.clone();
        inner
            .subscribers
            .retain(|tx| tx.send(next.clone()).is_ok());
    }

    /// Subscribe to the state stream.
    ///
    /// The receiver is seeded with the current state before any further
    /// transition can be delivered, so observers never miss where the
    /// client already is.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<ConnectionState> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut inner = self.inner.lock().unwrap();
        let _ = tx.send(inner.current.clone());
        inner.subscribers.push(tx);
        rx
    }
}

impl Default for ConnectionStateMachine {
    fn default() -> Self {
        Self::new()
    }
}
