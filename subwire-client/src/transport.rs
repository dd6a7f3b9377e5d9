//! Transport seam: one session per physical WebSocket connection
//!
//! The client never touches a socket directly. It opens sessions through the
//! [`Transport`] trait and talks to them through the [`FrameSink`] /
//! [`FrameStream`] halves, which keeps the connection lifecycle testable
//! with an in-memory fake.
//!
//! [`WsTransport`] is the production implementation over tokio-tungstenite.
//! Only text frames carry protocol data; binary frames and ping/pong are
//! ignored, and a Close frame ends the incoming sequence.

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use subwire_core::{Error, Result};
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

/// Opens sessions against an endpoint.
///
/// Implementations must be `Send + Sync` so the client can retry connects
/// from its background task. Object-safe: the client stores it as
/// `Arc<dyn Transport>`.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Open one session. On failure the returned `Error::Connection` carries
    /// the underlying failure text verbatim.
    async fn open(&self, url: &str) -> Result<(Box<dyn FrameSink>, Box<dyn FrameStream>)>;
}

/// Outgoing half of a session.
#[async_trait]
pub trait FrameSink: Send {
    /// Send one text frame.
    async fn send(&mut self, frame: String) -> Result<()>;

    /// Close the session. Idempotent and infallible.
    async fn close(&mut self);
}

/// Incoming half of a session: an unbounded sequence of text frames that
/// ends when the socket closes.
#[async_trait]
pub trait FrameStream: Send {
    /// Next incoming frame; `None` once the socket has closed.
    async fn next_frame(&mut self) -> Option<Result<String>>;
}

type WsSink = futures::stream::SplitSink<
    WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>,
    Message,
>;
type WsStream = futures::stream::SplitStream<WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>>;

/// WebSocket transport over tokio-tungstenite.
#[derive(Debug, Default)]
pub struct WsTransport;

#[async_trait]
impl Transport for WsTransport {
    async fn open(&self, url: &str) -> Result<(Box<dyn FrameSink>, Box<dyn FrameStream>)> {
        let (ws_stream, _) = connect_async(url)
            .await
            .map_err(|e| Error::Connection(e.to_string()))?;
        let (sink, stream) = ws_stream.split();
        Ok((
            Box::new(WsFrameSink { sink, closed: false }),
            Box::new(WsFrameStream { stream }),
        ))
    }
}

struct WsFrameSink {
    sink: WsSink,
    closed: bool,
}

#[async_trait]
impl FrameSink for WsFrameSink {
    async fn send(&mut self, frame: String) -> Result<()> {
        self.sink
            .send(Message::Text(frame))
            .await
            .map_err(|e| Error::Connection(e.to_string()))
    }

    async fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            let _ = self.sink.close().await;
        }
    }
}

struct WsFrameStream {
    stream: WsStream,
}

#[async_trait]
impl FrameStream for WsFrameStream {
    async fn next_frame(&mut self) -> Option<Result<String>> {
        while let Some(item) = self.stream.next().await {
            match item {
                Ok(Message::Text(text)) => return Some(Ok(text)),
                Ok(Message::Close(_)) => return None,
                // binary frames and ping/pong are not protocol data
                Ok(_) => continue,
                Err(e) => return Some(Err(Error::Connection(e.to_string()))),
            }
        }
        None
    }
}
