//! subwire - WebSocket JSON-RPC client for Substrate nodes
//!
//! This is the main convenience crate that re-exports the subwire sub-crates.
//! Use this crate if you want a single dependency that provides the client
//! and the wire-level types.
//!
//! # Architecture
//!
//! subwire is organized into modular crates:
//!
//! - **subwire-core**: JSON-RPC 2.0 wire types, codec, error taxonomy
//! - **subwire-client**: long-lived WebSocket client with request
//!   correlation and automatic reconnection
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use subwire::SubstrateClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = SubstrateClient::new();
//!     client.connect("ws://localhost:9944").await?;
//!
//!     let chain = client.system_chain().await?;
//!     println!("connected to {chain}");
//!
//!     client.disconnect().await;
//!     Ok(())
//! }
//! ```
//!
//! # Watching connectivity
//!
//! ```rust,no_run
//! use subwire::{ConnectionState, SubstrateClient};
//!
//! # async fn example() -> subwire::Result<()> {
//! let client = SubstrateClient::builder()
//!     .max_reconnect_attempts(5)
//!     .build();
//!
//! let mut states = client.subscribe_state();
//! tokio::spawn(async move {
//!     while let Some(state) = states.recv().await {
//!         if let ConnectionState::Error(reason) = state {
//!             eprintln!("connection trouble: {reason}");
//!         }
//!     }
//! });
//!
//! client.connect("wss://rpc.polkadot.io").await?;
//! # Ok(())
//! # }
//! ```

// Re-export the public APIs from the sub-crates so users can access
// everything through the `subwire::` prefix.
pub use subwire_client as client;
pub use subwire_core as core;

pub use subwire_client::{
    Backoff, ClientBuilder, ConnectionState, Diagnostics, FrameSink, FrameStream, SubstrateClient,
    Transport, WsTransport,
};
pub use subwire_core::{codec, Error, Result, RpcRequest, RpcResponse};
