//! Shared test doubles for the client integration tests
//!
//! Two stand-ins for a node are provided:
//!
//! - [`MockNode`]: a real WebSocket server on a loopback port, for tests
//!   that should exercise the tungstenite transport end to end
//! - [`FakeTransport`]: an in-memory transport with scriptable responses,
//!   connection refusal and session kills, for deterministic lifecycle and
//!   reconnection scenarios

#![allow(dead_code)]

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use subwire_client::{FrameSink, FrameStream, Transport};
use subwire_core::{Error, Result, RpcRequest, RpcResponse};
use tokio::net::TcpListener;
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

/// Real WebSocket server answering frames through a handler closure.
pub struct MockNode {
    addr: SocketAddr,
    shutdown_tx: mpsc::Sender<()>,
    message_rx: mpsc::Receiver<String>,
}

impl MockNode {
    /// Start a node whose handler maps each incoming frame to an optional
    /// reply frame.
    pub async fn start<F>(handler: F) -> Self
    where
        F: Fn(String) -> Option<String> + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
        let (msg_tx, message_rx) = mpsc::channel::<String>(100);
        let handler = Arc::new(handler);

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => break,
                    accepted = listener.accept() => {
                        let Ok((stream, _)) = accepted else { break };
                        let handler = Arc::clone(&handler);
                        let msg_tx = msg_tx.clone();
                        tokio::spawn(async move {
                            let Ok(ws) = accept_async(stream).await else { return };
                            let (mut write, mut read) = ws.split();
                            while let Some(Ok(msg)) = read.next().await {
                                if let Message::Text(text) = msg {
                                    let _ = msg_tx.send(text.clone()).await;
                                    if let Some(reply) = handler(text) {
                                        if write.send(Message::Text(reply)).await.is_err() {
                                            break;
                                        }
                                    }
                                }
                            }
                        });
                    }
                }
            }
        });

        Self {
            addr,
            shutdown_tx,
            message_rx,
        }
    }

    /// A node that answers the handful of methods the tests use.
    pub async fn development_chain() -> Self {
        Self::start(|frame| {
            let req: RpcRequest = serde_json::from_str(&frame).ok()?;
            let response = match req.method.as_str() {
                "system_chain" => RpcResponse::success(req.id, json!("Development")),
                "state_getMetadata" => RpcResponse::success(req.id, json!("0x6d657461")),
                _ => RpcResponse::failure(
                    req.id,
                    json!({"code": -32601, "message": "Method not found"}),
                ),
            };
            serde_json::to_string(&response).ok()
        })
        .await
    }

    pub fn url(&self) -> String {
        format!("ws://{}", self.addr)
    }

    /// Next frame the node received, bounded by a generous timeout.
    pub async fn seen_frame(&mut self) -> Option<String> {
        tokio::time::timeout(std::time::Duration::from_secs(5), self.message_rx.recv())
            .await
            .ok()
            .flatten()
    }

    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    }
}

type Responder = Arc<dyn Fn(&RpcRequest) -> Vec<RpcResponse> + Send + Sync>;

/// In-memory transport. Clone it before handing it to the builder to keep
/// a handle for counting opens, injecting frames and killing sessions.
#[derive(Clone)]
pub struct FakeTransport {
    responder: Responder,
    /// opens left to refuse; `u32::MAX` refuses forever
    fail_opens: Arc<AtomicU32>,
    opens: Arc<AtomicU32>,
    requests: Arc<Mutex<Vec<RpcRequest>>>,
    injector: Arc<Mutex<Option<mpsc::UnboundedSender<String>>>>,
    closer: Arc<Mutex<Option<watch::Sender<bool>>>>,
}

impl FakeTransport {
    fn with_responder(responder: Responder) -> Self {
        Self {
            responder,
            fail_opens: Arc::new(AtomicU32::new(0)),
            opens: Arc::new(AtomicU32::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
            injector: Arc::new(Mutex::new(None)),
            closer: Arc::new(Mutex::new(None)),
        }
    }

    /// Answer each request through `f`; `None` means stay silent.
    pub fn scripted<F>(f: F) -> Self
    where
        F: Fn(&RpcRequest) -> Option<RpcResponse> + Send + Sync + 'static,
    {
        Self::with_responder(Arc::new(move |req| f(req).into_iter().collect()))
    }

    /// Answer each request with several frames at once (e.g. to reorder
    /// responses across calls).
    pub fn batching<F>(f: F) -> Self
    where
        F: Fn(&RpcRequest) -> Vec<RpcResponse> + Send + Sync + 'static,
    {
        Self::with_responder(Arc::new(f))
    }

    /// Echo each request's own id and method back as the result.
    pub fn echoing() -> Self {
        Self::scripted(|req| {
            Some(RpcResponse::success(
                req.id,
                json!({"id": req.id, "method": req.method}),
            ))
        })
    }

    /// Accept connections but never answer anything.
    pub fn silent() -> Self {
        Self::scripted(|_| None)
    }

    /// Refuse every connection attempt.
    pub fn refusing() -> Self {
        let transport = Self::silent();
        transport.fail_opens.store(u32::MAX, Ordering::SeqCst);
        transport
    }

    /// Refuse the first `n` connection attempts, then behave like `self`.
    pub fn failing_first(self, n: u32) -> Self {
        self.fail_opens.store(n, Ordering::SeqCst);
        self
    }

    /// Number of `open` calls observed so far.
    pub fn opens(&self) -> u32 {
        self.opens.load(Ordering::SeqCst)
    }

    /// Every request frame the client has sent, in order.
    pub fn requests(&self) -> Vec<RpcRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Push a raw frame into the current session's incoming stream.
    pub fn inject(&self, frame: impl Into<String>) {
        if let Some(tx) = &*self.injector.lock().unwrap() {
            let _ = tx.send(frame.into());
        }
    }

    /// End the current session's incoming stream, as a dropped socket would.
    pub fn kill_session(&self) {
        if let Some(tx) = &*self.closer.lock().unwrap() {
            let _ = tx.send(true);
        }
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn open(&self, url: &str) -> Result<(Box<dyn FrameSink>, Box<dyn FrameStream>)> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        let remaining = self.fail_opens.load(Ordering::SeqCst);
        if remaining > 0 {
            if remaining != u32::MAX {
                self.fail_opens.store(remaining - 1, Ordering::SeqCst);
            }
            return Err(Error::Connection(format!("connection refused: {url}")));
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let (closed_tx, closed_rx) = watch::channel(false);
        *self.injector.lock().unwrap() = Some(tx.clone());
        *self.closer.lock().unwrap() = Some(closed_tx);

        Ok((
            Box::new(FakeSink {
                responder: Arc::clone(&self.responder),
                requests: Arc::clone(&self.requests),
                out: tx,
            }),
            Box::new(FakeStream {
                rx,
                closed: closed_rx,
            }),
        ))
    }
}

struct FakeSink {
    responder: Responder,
    requests: Arc<Mutex<Vec<RpcRequest>>>,
    out: mpsc::UnboundedSender<String>,
}

#[async_trait]
impl FrameSink for FakeSink {
    async fn send(&mut self, frame: String) -> Result<()> {
        let Ok(request) = serde_json::from_str::<RpcRequest>(&frame) else {
            return Ok(());
        };
        self.requests.lock().unwrap().push(request.clone());
        for response in (self.responder)(&request) {
            if let Ok(reply) = serde_json::to_string(&response) {
                let _ = self.out.send(reply);
            }
        }
        Ok(())
    }

    async fn close(&mut self) {}
}

struct FakeStream {
    rx: mpsc::UnboundedReceiver<String>,
    closed: watch::Receiver<bool>,
}

#[async_trait]
impl FrameStream for FakeStream {
    async fn next_frame(&mut self) -> Option<Result<String>> {
        loop {
            if *self.closed.borrow() {
                return None;
            }
            tokio::select! {
                frame = self.rx.recv() => return frame.map(Ok),
                changed = self.closed.changed() => {
                    if changed.is_err() {
                        return None;
                    }
                }
            }
        }
    }
}
