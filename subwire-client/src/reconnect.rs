//! Reconnection backoff policy
//!
//! When a connection attempt or a live session fails, the connection task
//! consults a [`Backoff`] for the next delay. Delays grow exponentially
//! from `initial` and are capped at `max`; with the defaults of 1s/16s the
//! sequence is 1s, 2s, 4s, 8s, 16s, 16s, ...
//!
//! `max_attempts` bounds the retries: once that many delays have been
//! handed out, [`next_delay`](Backoff::next_delay) returns `None` and the
//! client gives up until the next explicit `connect()`. Zero disables
//! retries entirely. The attempt counter resets on every successful
//! connection.

use std::time::Duration;

const DEFAULT_INITIAL: Duration = Duration::from_secs(1);
const DEFAULT_MAX: Duration = Duration::from_secs(16);
const DEFAULT_MAX_ATTEMPTS: u32 = 10;

/// Exponential backoff with an attempt bound and optional jitter.
#[derive(Debug, Clone)]
pub struct Backoff {
    initial: Duration,
    max: Duration,
    max_attempts: u32,
    jitter: bool,
    attempt: u32,
}

impl Backoff {
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self {
            initial,
            max,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            jitter: false,
            attempt: 0,
        }
    }

    /// Bound the number of retries; 0 means fail permanently on the first
    /// failure.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Randomize each delay upward by up to 25% to avoid thundering herds
    /// of clients reconnecting in lockstep.
    pub fn with_jitter(mut self) -> Self {
        self.jitter = true;
        self
    }

    /// Delay before the next attempt, or `None` once the attempt budget is
    /// spent.
    pub fn next_delay(&mut self) -> Option<Duration> {
        if self.attempt >= self.max_attempts {
            return None;
        }
        let base = (self.initial.as_millis() as u64)
            .saturating_mul(2u64.saturating_pow(self.attempt))
            .min(self.max.as_millis() as u64);
        self.attempt += 1;

        let delay = if self.jitter {
            use rand::Rng;
            base + rand::thread_rng().gen_range(0..=base / 4)
        } else {
            base
        };
        Some(Duration::from_millis(delay))
    }

    /// Attempts handed out since the last reset.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Called after a successful connection so the next failure starts the
    /// schedule from the beginning.
    pub fn reset(&mut self) {
        self.attempt = 0;
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(DEFAULT_INITIAL, DEFAULT_MAX)
    }
}
