// SPDX-License-Identifier: MIT

//! Testable time abstraction.
//!
//! Scheduling, retry backoff, and lease-expiry logic all need to reason
//! about wall-clock epoch milliseconds without sleeping in tests. [`Clock`]
//! is the seam; [`SystemClock`] is the production implementation and
//! [`FakeClock`] lets tests advance time deterministically.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// Source of the current time, expressed as milliseconds since the Unix epoch.
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// Current time in milliseconds since the Unix epoch.
    fn now_ms(&self) -> i64;

    /// Current time as an RFC3339 timestamp.
    fn now(&self) -> chrono::DateTime<chrono::Utc> {
        chrono::DateTime::from_timestamp_millis(self.now_ms()).unwrap_or_else(chrono::Utc::now)
    }
}

/// [`Clock`] backed by the OS wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// [`Clock`] with a manually advanced epoch, for deterministic tests of
/// scheduled-wake, retry-backoff, and lease-expiry behavior.
#[derive(Debug, Clone)]
pub struct FakeClock {
    epoch_ms: Arc<AtomicI64>,
}

impl FakeClock {
    /// Construct a fake clock starting at the given epoch milliseconds.
    pub fn new(start_epoch_ms: i64) -> Self {
        Self { epoch_ms: Arc::new(AtomicI64::new(start_epoch_ms)) }
    }

    /// Advance the clock by `delta_ms` milliseconds.
    pub fn advance(&self, delta_ms: i64) {
        self.epoch_ms.fetch_add(delta_ms, Ordering::SeqCst);
    }

    /// Set the clock to an absolute epoch.
    pub fn set_epoch_ms(&self, epoch_ms: i64) {
        self.epoch_ms.store(epoch_ms, Ordering::SeqCst);
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new(0)
    }
}

impl Clock for FakeClock {
    fn now_ms(&self) -> i64 {
        self.epoch_ms.load(Ordering::SeqCst)
    }
}
