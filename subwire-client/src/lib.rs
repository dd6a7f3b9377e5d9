//! Long-lived WebSocket JSON-RPC client for Substrate nodes
//!
//! This crate keeps one connection to a node alive, multiplexes concurrent
//! calls over it, and recovers automatically from transient connection
//! loss.
//!
//! # Core Features
//!
//! - **Request multiplexing**: any number of calls in flight at once,
//!   matched to their responses strictly by correlation id
//! - **Connection state machine**: Disconnected / Connecting / Connected /
//!   Error, published to observers in occurrence order
//! - **Auto-reconnection**: exponential backoff (1s doubling to a 16s cap),
//!   bounded attempts, counter reset on success
//! - **Per-call timeouts**: 30s default, overridable per invocation; late
//!   responses are dropped, never misrouted
//! - **Metadata cache**: best-effort `state_getMetadata` snapshot exposed
//!   as a watch channel
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use subwire_client::SubstrateClient;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> subwire_core::Result<()> {
//!     let client = SubstrateClient::new();
//!     client.connect("ws://localhost:9944").await?;
//!
//!     let chain = client.system_chain().await?;
//!     let balance = client
//!         .call("system_accountNextIndex", vec![json!("5Grw...")])
//!         .await?;
//!     println!("{chain}: {balance}");
//!
//!     client.disconnect().await;
//!     Ok(())
//! }
//! ```

mod client;
mod client_builder;
mod connection_state;
mod correlator;
mod diagnostics;
mod reconnect;
mod transport;

pub use client::{SubstrateClient, DEFAULT_CALL_TIMEOUT};
pub use client_builder::ClientBuilder;
pub use connection_state::{ConnectionState, ConnectionStateMachine};
pub use correlator::RequestCorrelator;
pub use diagnostics::Diagnostics;
pub use reconnect::Backoff;
pub use transport::{FrameSink, FrameStream, Transport, WsTransport};
