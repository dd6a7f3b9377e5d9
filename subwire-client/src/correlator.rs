//! Request correlation: matching responses back to their callers
//!
//! Every in-flight call owns a dedicated oneshot channel keyed by its
//! correlation id. A shared queue would let an unrelated fast caller consume
//! another caller's response; per-call channels make cross-wiring
//! impossible, and oneshot cleanup is automatic.
//!
//! The id counter and the pending map live behind a single mutex so that id
//! allocation and registration are one atomic step - a response can never
//! arrive before its own call is routable. Callers must therefore
//! [`register`](RequestCorrelator::register) *before* sending the frame.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use subwire_core::{Error, Result, RpcResponse};
use tokio::sync::oneshot;

/// A call waiting for its response.
struct PendingCall {
    tx: oneshot::Sender<Result<RpcResponse>>,
}

struct Inner {
    next_id: u64,
    pending: HashMap<u64, PendingCall>,
}

/// Sole owner of the pending-call map and the id counter.
#[derive(Clone)]
pub struct RequestCorrelator {
    inner: Arc<Mutex<Inner>>,
}

impl RequestCorrelator {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                next_id: 1,
                pending: HashMap::new(),
            })),
        }
    }

    /// Allocate the next id and insert an unresolved slot for it, atomically.
    pub fn register(&self) -> (u64, oneshot::Receiver<Result<RpcResponse>>) {
        let (tx, rx) = oneshot::channel();
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.pending.insert(id, PendingCall { tx });
        (id, rx)
    }

    /// Resolve the call registered under `id`.
    ///
    /// Returns `false` when no such call is pending (already timed out,
    /// duplicate, or foreign id) - the caller logs and drops the response.
    pub fn complete(&self, id: u64, response: RpcResponse) -> bool {
        let slot = self.inner.lock().unwrap().pending.remove(&id);
        match slot {
            Some(call) => {
                // the caller may have given up between removal and send
                let _ = call.tx.send(Ok(response));
                true
            }
            None => false,
        }
    }

    /// Remove a slot without resolving it (timeout path). Any response that
    /// later arrives for `id` takes the unknown-id path in `complete`.
    pub fn discard(&self, id: u64) -> bool {
        self.inner.lock().unwrap().pending.remove(&id).is_some()
    }

    /// Resolve every outstanding call with a clone of `error`.
    ///
    /// Used on disconnect and teardown so no caller blocks forever. Returns
    /// how many calls were cancelled.
    pub fn cancel_all(&self, error: Error) -> usize {
        let drained: Vec<PendingCall> = {
            let mut inner = self.inner.lock().unwrap();
            inner.pending.drain().map(|(_, call)| call).collect()
        };
        let count = drained.len();
        for call in drained {
            let _ = call.tx.send(Err(error.clone()));
        }
        count
    }

    /// Number of calls currently awaiting a response.
    pub fn pending_count(&self) -> usize {
        self.inner.lock().unwrap().pending.len()
    }
}

impl Default for RequestCorrelator {
    fn default() -> Self {
        Self::new()
    }
}
