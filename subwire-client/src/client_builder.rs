//! Client configuration
//!
//! The builder collects everything configurable about a client before it is
//! handed out: transport, reconnection policy and the default call
//! deadline. `build()` is synchronous - the client connects later, via
//! [`SubstrateClient::connect`].
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use subwire_client::{Backoff, SubstrateClient};
//!
//! let client = SubstrateClient::builder()
//!     .backoff(Backoff::new(Duration::from_millis(500), Duration::from_secs(8)))
//!     .max_reconnect_attempts(5)
//!     .call_timeout(Duration::from_secs(10))
//!     .build();
//! ```

use crate::client::{ClientConfig, ClientInner, ConnTask, ShutdownGuard, DEFAULT_CALL_TIMEOUT};
use crate::connection_state::ConnectionStateMachine;
use crate::correlator::RequestCorrelator;
use crate::diagnostics::Diagnostics;
use crate::reconnect::Backoff;
use crate::transport::{Transport, WsTransport};
use crate::SubstrateClient;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;

/// Builder for [`SubstrateClient`].
pub struct ClientBuilder {
    transport: Arc<dyn Transport>,
    auto_reconnect: bool,
    backoff: Backoff,
    call_timeout: Duration,
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self {
            transport: Arc::new(WsTransport),
            auto_reconnect: true,
            backoff: Backoff::default(),
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    /// Swap the transport; tests use this to run against an in-memory fake.
    pub fn transport(mut self, transport: impl Transport) -> Self {
        self.transport = Arc::new(transport);
        self
    }

    /// Enable or disable automatic reconnection (enabled by default).
    pub fn auto_reconnect(mut self, enabled: bool) -> Self {
        self.auto_reconnect = enabled;
        self
    }

    /// Replace the reconnection backoff policy.
    pub fn backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Bound the number of reconnection attempts after a failure; 0 means
    /// a single failure is permanent.
    pub fn max_reconnect_attempts(mut self, max_attempts: u32) -> Self {
        self.backoff = self.backoff.with_max_attempts(max_attempts);
        self
    }

    /// Default deadline applied to every call (callers can still override
    /// per invocation).
    pub fn call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    pub fn build(self) -> SubstrateClient {
        let (metadata, _) = watch::channel(None);
        let inner = Arc::new(ClientInner {
            transport: self.transport,
            state: ConnectionStateMachine::new(),
            correlator: RequestCorrelator::new(),
            diagnostics: Arc::new(Diagnostics::default()),
            sink: tokio::sync::Mutex::new(None),
            metadata,
            conn: Mutex::new(ConnTask::default()),
            config: ClientConfig {
                auto_reconnect: self.auto_reconnect,
                backoff: self.backoff,
                call_timeout: self.call_timeout,
            },
        });
        SubstrateClient {
            inner: Arc::clone(&inner),
            _guard: Arc::new(ShutdownGuard { inner }),
        }
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
