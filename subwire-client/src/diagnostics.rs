//! Frame-level diagnostic counters
//!
//! The dispatcher records what it drops here: undecodable frames, responses
//! whose id matches no pending call, and id-less notification frames.
//! Reading the counters never affects control flow; they exist so tests and
//! operators can see silent drops that are otherwise only visible in logs.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters maintained by the dispatcher loop.
#[derive(Debug, Default)]
pub struct Diagnostics {
    frames_received: AtomicU64,
    decode_failures: AtomicU64,
    dropped_responses: AtomicU64,
    dropped_notifications: AtomicU64,
}

impl Diagnostics {
    pub(crate) fn record_frame(&self) {
        self.frames_received.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_decode_failure(&self) {
        self.decode_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_dropped_response(&self) {
        self.dropped_responses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_dropped_notification(&self) {
        self.dropped_notifications.fetch_add(1, Ordering::Relaxed);
    }

    /// Total text frames seen on the socket.
    pub fn frames_received(&self) -> u64 {
        self.frames_received.load(Ordering::Relaxed)
    }

    /// Frames that failed to decode and were skipped.
    pub fn decode_failures(&self) -> u64 {
        self.decode_failures.load(Ordering::Relaxed)
    }

    /// Responses dropped because their id matched no pending call
    /// (typically a response arriving after its call timed out).
    pub fn dropped_responses(&self) -> u64 {
        self.dropped_responses.load(Ordering::Relaxed)
    }

    /// Id-less frames dropped because subscriptions are not supported.
    pub fn dropped_notifications(&self) -> u64 {
        self.dropped_notifications.load(Ordering::Relaxed)
    }
}
