mod reporter;
mod snapshot;

pub use reporter::ProgressReporter;
pub use snapshot::StatsSnapshot;

use std::sync::atomic::{AtomicU64, Ordering};
use tokio::time::Instant;

/// Run-wide counters. Written by the sending path only and read concurrently
/// by the reporter; every counter is monotonically non-decreasing.
#[derive(Debug)]
pub struct RunStats {
    messages_sent: AtomicU64,
    bytes_sent: AtomicU64,
    errors: AtomicU64,
    start_time: Instant,
}

impl RunStats {
    pub fn new() -> Self {
        Self::started_at(Instant::now())
    }

    pub fn started_at(start_time: Instant) -> Self {
        Self {
            messages_sent: AtomicU64::new(0),
            bytes_sent: AtomicU64::new(0),
            errors: AtomicU64::new(0),
            start_time,
        }
    }

    pub fn record_sent(&self, bytes: usize) {
        self.messages_sent.fetch_add(1, Ordering::Relaxed);
        self.bytes_sent.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    pub fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn messages_sent(&self) -> u64 {
        self.messages_sent.load(Ordering::Relaxed)
    }

    pub fn bytes_sent(&self) -> u64 {
        self.bytes_sent.load(Ordering::Relaxed)
    }

    pub fn errors(&self) -> u64 {
        self.errors.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            elapsed: self.start_time.elapsed(),
            messages: self.messages_sent(),
            bytes: self.bytes_sent(),
            errors: self.errors(),
        }
    }
}

impl Default for RunStats {
    fn default() -> Self {
        Self::new()
    }
}
