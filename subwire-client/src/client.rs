//! The Substrate client facade
//!
//! `SubstrateClient` owns one logical connection to a node and multiplexes
//! any number of concurrent calls over it. The moving parts:
//!
//! - a transport session (sink + stream halves) for the live socket
//! - the [`RequestCorrelator`] matching responses to callers by id
//! - the [`ConnectionStateMachine`] publishing lifecycle transitions
//! - one background *connection task* per `connect()`, which runs the
//!   dispatcher loop over the incoming frames and, when the session dies,
//!   drives backoff-paced reconnection attempts
//!
//! # Cloning and teardown
//!
//! The client is cheaply cloneable; clones share the connection. When the
//! last clone is dropped the connection task is aborted and every pending
//! call resolves with `Error::Cancelled`, so no background work or blocked
//! caller survives the owner.

use crate::connection_state::{ConnectionState, ConnectionStateMachine};
use crate::correlator::RequestCorrelator;
use crate::diagnostics::Diagnostics;
use crate::reconnect::Backoff;
use crate::transport::{FrameSink, FrameStream, Transport};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use subwire_core::{codec, Error, Result, RpcRequest};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

/// Default per-call deadline; callers can override it per invocation.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Well-known method answering with the runtime metadata blob.
const METADATA_METHOD: &str = "state_getMetadata";

/// WebSocket JSON-RPC client for Substrate nodes.
#[derive(Clone)]
pub struct SubstrateClient {
    pub(crate) inner: Arc<ClientInner>,
    // dropped with the last facade clone; background tasks hold `inner`
    // only, so teardown runs even while the connection task is alive
    pub(crate) _guard: Arc<ShutdownGuard>,
}

pub(crate) struct ClientInner {
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) state: ConnectionStateMachine,
    pub(crate) correlator: RequestCorrelator,
    pub(crate) diagnostics: Arc<Diagnostics>,
    /// Outgoing half of the live session; `None` whenever no session is up.
    pub(crate) sink: tokio::sync::Mutex<Option<Box<dyn FrameSink>>>,
    /// Raw runtime metadata as returned by the node, cached best-effort.
    pub(crate) metadata: watch::Sender<Option<String>>,
    pub(crate) conn: Mutex<ConnTask>,
    pub(crate) config: ClientConfig,
}

#[derive(Default)]
pub(crate) struct ConnTask {
    pub(crate) endpoint: Option<String>,
    pub(crate) task: Option<JoinHandle<()>>,
}

#[derive(Clone)]
pub(crate) struct ClientConfig {
    pub(crate) auto_reconnect: bool,
    pub(crate) backoff: Backoff,
    pub(crate) call_timeout: Duration,
}

pub(crate) struct ShutdownGuard {
    pub(crate) inner: Arc<ClientInner>,
}

impl Drop for ShutdownGuard {
    fn drop(&mut self) {
        if let Ok(mut conn) = self.inner.conn.lock() {
            if let Some(task) = conn.task.take() {
                task.abort();
            }
        }
        let cancelled = self
            .inner
            .correlator
            .cancel_all(Error::Cancelled("client dropped".into()));
        if cancelled > 0 {
            tracing::debug!(cancelled, "cancelled pending calls on teardown");
        }
    }
}

impl SubstrateClient {
    /// Client with the default configuration: real WebSocket transport,
    /// auto-reconnect on, 1s-16s backoff, 30s call timeout.
    pub fn new() -> Self {
        crate::ClientBuilder::new().build()
    }

    pub fn builder() -> crate::ClientBuilder {
        crate::ClientBuilder::new()
    }

    /// Connect to `endpoint`.
    ///
    /// A no-op when already connected. Otherwise any previous connection
    /// task (including a scheduled reconnect) is replaced, the endpoint is
    /// remembered for retries, and the connect sequence runs: Connecting,
    /// then Connected or Error. On failure the error is returned *and*,
    /// with auto-reconnect enabled, retries continue in the background.
    pub async fn connect(&self, endpoint: &str) -> Result<()> {
        if self.inner.state.state().is_connected() {
            tracing::debug!(url = %endpoint, "connect ignored, session already live");
            return Ok(());
        }
        {
            let mut conn = self.inner.conn.lock().unwrap();
            if let Some(task) = conn.task.take() {
                task.abort();
            }
            conn.endpoint = Some(endpoint.to_string());
        }
        self.inner.open_session(endpoint).await
    }

    /// Tear the connection down from any state.
    ///
    /// Cancels a scheduled reconnect, resolves every pending call with
    /// `Error::Cancelled`, closes the session and clears the cached
    /// metadata. Idempotent.
    pub async fn disconnect(&self) {
        let task = {
            let mut conn = self.inner.conn.lock().unwrap();
            conn.task.take()
        };
        if let Some(task) = task {
            task.abort();
        }
        let cancelled = self
            .inner
            .correlator
            .cancel_all(Error::Cancelled("disconnected".into()));
        if cancelled > 0 {
            tracing::debug!(cancelled, "cancelled pending calls");
        }
        if let Some(mut sink) = self.inner.sink.lock().await.take() {
            sink.close().await;
        }
        self.inner.metadata.send_replace(None);
        if self.inner.state.state() != ConnectionState::Disconnected {
            self.inner.state.transition(ConnectionState::Disconnected);
        }
        tracing::info!("disconnected");
    }

    /// Invoke `method` with the default call timeout.
    pub async fn call(&self, method: &str, params: Vec<Value>) -> Result<Value> {
        self.inner
            .call_value(method, params, self.inner.config.call_timeout)
            .await
    }

    /// Invoke `method` with an explicit deadline.
    ///
    /// On timeout the pending slot is discarded, so a response that arrives
    /// later is dropped on the unknown-id path instead of resolving a
    /// stranger's call.
    pub async fn call_with_timeout(
        &self,
        method: &str,
        params: Vec<Value>,
        timeout: Duration,
    ) -> Result<Value> {
        self.inner.call_value(method, params, timeout).await
    }

    /// Invoke `method` and deserialize the result.
    pub async fn call_typed<R>(&self, method: &str, params: Vec<Value>) -> Result<R>
    where
        R: DeserializeOwned,
    {
        let value = self.call(method, params).await?;
        serde_json::from_value(value).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Name of the chain the node serves (`system_chain`).
    pub async fn system_chain(&self) -> Result<String> {
        self.call_typed("system_chain", Vec::new()).await
    }

    /// Kick off a best-effort background metadata refresh.
    ///
    /// Runs automatically after every successful (re)connect; failure is
    /// logged and swallowed - the metadata is a cache, not a liveness
    /// signal.
    pub fn fetch_metadata(&self) {
        self.inner.spawn_metadata_fetch();
    }

    /// Snapshot of the connection state.
    pub fn state(&self) -> ConnectionState {
        self.inner.state.state()
    }

    pub fn is_connected(&self) -> bool {
        self.inner.state.state().is_connected()
    }

    /// Ordered stream of connection-state transitions, seeded with the
    /// current state.
    pub fn subscribe_state(&self) -> mpsc::UnboundedReceiver<ConnectionState> {
        self.inner.state.subscribe()
    }

    /// Watch the cached runtime metadata. `None` until the first successful
    /// fetch and again after a disconnect.
    pub fn metadata(&self) -> watch::Receiver<Option<String>> {
        self.inner.metadata.subscribe()
    }

    /// Counters for silently dropped frames.
    pub fn diagnostics(&self) -> Arc<Diagnostics> {
        Arc::clone(&self.inner.diagnostics)
    }
}

impl Default for SubstrateClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientInner {
    /// Run the connect sequence once and hand the session to a fresh
    /// connection task.
    async fn open_session(self: &Arc<Self>, endpoint: &str) -> Result<()> {
        self.state.transition(ConnectionState::Connecting);
        tracing::info!(url = %endpoint, "connecting");
        match self.transport.open(endpoint).await {
            Ok((sink, stream)) => {
                *self.sink.lock().await = Some(sink);
                self.state.transition(ConnectionState::Connected);
                tracing::info!(url = %endpoint, "connected");
                self.install_task(tokio::spawn(connection_task(
                    Arc::clone(self),
                    Some(stream),
                )));
                self.spawn_metadata_fetch();
                Ok(())
            }
            Err(e) => {
                let reason = match &e {
                    Error::Connection(message) => message.clone(),
                    other => other.to_string(),
                };
                tracing::warn!(url = %endpoint, error = %reason, "handshake failed");
                self.state.transition(ConnectionState::Error(reason));
                if self.config.auto_reconnect {
                    self.install_task(tokio::spawn(connection_task(Arc::clone(self), None)));
                }
                Err(e)
            }
        }
    }

    fn install_task(&self, task: JoinHandle<()>) {
        if let Ok(mut conn) = self.conn.lock() {
            if let Some(old) = conn.task.replace(task) {
                old.abort();
            }
        }
    }

    #[tracing::instrument(skip(self, method, params, timeout), fields(method = %method))]
    pub(crate) async fn call_value(
        &self,
        method: &str,
        params: Vec<Value>,
        timeout: Duration,
    ) -> Result<Value> {
        // register under the sink lock, before the frame leaves: a response
        // must never be able to outrace its own call's registration
        let (id, rx) = {
            let mut guard = self.sink.lock().await;
            let sink = guard.as_mut().ok_or(Error::NotConnected)?;
            let (id, rx) = self.correlator.register();
            let frame = match codec::encode_request(&RpcRequest::new(id, method, params)) {
                Ok(frame) => frame,
                Err(e) => {
                    self.correlator.discard(id);
                    return Err(e);
                }
            };
            tracing::debug!(id, "sending request");
            if let Err(e) = sink.send(frame).await {
                self.correlator.discard(id);
                return Err(e);
            }
            (id, rx)
        };

        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(Ok(response))) => {
                if let Some(error) = response.error {
                    return Err(Error::Rpc(error));
                }
                Ok(response.result.unwrap_or(Value::Null))
            }
            Ok(Ok(Err(e))) => Err(e),
            // correlator dropped without resolving: client torn down
            Ok(Err(_)) => Err(Error::Cancelled("client dropped".into())),
            Err(_) => {
                self.correlator.discard(id);
                tracing::warn!(id, timeout_ms = timeout.as_millis() as u64, "request timed out");
                Err(Error::Timeout)
            }
        }
    }

    fn spawn_metadata_fetch(self: &Arc<Self>) {
        let inner = Arc::clone(self);
        tokio::spawn(async move {
            match inner
                .call_value(METADATA_METHOD, Vec::new(), inner.config.call_timeout)
                .await
            {
                Ok(Value::String(raw)) => {
                    tracing::debug!(len = raw.len(), "runtime metadata cached");
                    inner.metadata.send_replace(Some(raw));
                }
                Ok(_) => tracing::warn!("metadata response had an unexpected shape"),
                Err(e) => tracing::warn!(error = %e, "metadata fetch failed"),
            }
        });
    }
}

/// Background task owning the incoming half of the connection.
///
/// Dispatches frames until the session dies, then alternates backoff sleeps
/// with fresh connect sequences until one succeeds or the attempt budget is
/// spent. Exactly one of these runs per `connect()`; `disconnect()` and
/// client teardown abort it.
async fn connection_task(inner: Arc<ClientInner>, mut stream: Option<Box<dyn FrameStream>>) {
    let mut backoff = inner.config.backoff.clone();
    loop {
        if let Some(active) = stream.take() {
            let reason = dispatch_loop(&inner, active).await;
            *inner.sink.lock().await = None;
            tracing::warn!(error = %reason, "session lost");
            inner.state.transition(ConnectionState::Error(reason));
        }

        if !inner.config.auto_reconnect {
            return;
        }
        let Some(delay) = backoff.next_delay() else {
            tracing::warn!("reconnect attempts exhausted, giving up");
            inner
                .correlator
                .cancel_all(Error::Connection("reconnect attempts exhausted".into()));
            return;
        };
        tracing::info!(
            delay_ms = delay.as_millis() as u64,
            attempt = backoff.attempt(),
            "reconnecting after backoff"
        );
        tokio::time::sleep(delay).await;

        let endpoint = match inner.conn.lock().unwrap().endpoint.clone() {
            Some(endpoint) => endpoint,
            None => return,
        };
        inner.state.transition(ConnectionState::Connecting);
        match inner.transport.open(&endpoint).await {
            Ok((sink, new_stream)) => {
                *inner.sink.lock().await = Some(sink);
                inner.state.transition(ConnectionState::Connected);
                tracing::info!(url = %endpoint, "reconnected");
                backoff.reset();
                inner.spawn_metadata_fetch();
                stream = Some(new_stream);
            }
            Err(e) => {
                let reason = match &e {
                    Error::Connection(message) => message.clone(),
                    other => other.to_string(),
                };
                tracing::warn!(url = %endpoint, error = %reason, "reconnect attempt failed");
                inner.state.transition(ConnectionState::Error(reason));
            }
        }
    }
}

/// Read frames off one session until it closes or errors.
///
/// Returns the failure message. A frame that fails to decode is logged,
/// counted and skipped - a single bad frame must never take the loop (or
/// unrelated in-flight calls) down with it.
async fn dispatch_loop(inner: &ClientInner, mut stream: Box<dyn FrameStream>) -> String {
    loop {
        match stream.next_frame().await {
            Some(Ok(frame)) => {
                inner.diagnostics.record_frame();
                match codec::decode_response(&frame) {
                    Ok(response) => match response.id {
                        Some(id) => {
                            if !inner.correlator.complete(id, response) {
                                inner.diagnostics.record_dropped_response();
                                tracing::warn!(id, "dropped response with no pending call");
                            }
                        }
                        None => {
                            // server-initiated notification; subscriptions
                            // are not supported
                            inner.diagnostics.record_dropped_notification();
                            tracing::debug!("ignoring frame without correlation id");
                        }
                    },
                    Err(e) => {
                        inner.diagnostics.record_decode_failure();
                        tracing::warn!(error = %e, "skipping undecodable frame");
                    }
                }
            }
            Some(Err(e)) => {
                return match e {
                    Error::Connection(message) => message,
                    other => other.to_string(),
                }
            }
            None => return "connection closed by peer".to_string(),
        }
    }
}
