//! Observability state for the backend sync loop
//!
//! Read by the external admin surface; written only by the sync task. Plain
//! atomics plus a lock around the error string, same shape as any of our
//! counter registries.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::RwLock;
use serde::Serialize;

/// Sync loop status registry
#[derive(Debug, Default)]
pub struct SyncStatus {
    /// Epoch millis of the last successful push, 0 if never
    last_success_ms: AtomicU64,
    /// Records sent in the last successful push
    last_sent: AtomicU64,
    /// Cycles skipped because the position buffer was empty
    cycles_skipped: AtomicU64,
    /// Cycles that ended in a network or HTTP failure
    cycles_failed: AtomicU64,
    /// Most recent failure, cleared on success
    last_error: RwLock<Option<String>>,
}

/// Point-in-time copy of [`SyncStatus`] for the admin surface
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StatusSnapshot {
    pub last_success_ms: u64,
    pub last_sent: u64,
    pub cycles_skipped: u64,
    pub cycles_failed: u64,
    pub last_error: Option<String>,
}

impl SyncStatus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful push of `sent` records
    pub fn record_success(&self, sent: usize) {
        self.last_success_ms.store(epoch_millis(), Ordering::Relaxed);
        self.last_sent.store(sent as u64, Ordering::Relaxed);
        *self.last_error.write() = None;
    }

    /// Record a failed cycle; supersedes any earlier error
    pub fn record_failure(&self, reason: &str) {
        self.cycles_failed.fetch_add(1, Ordering::Relaxed);
        *self.last_error.write() = Some(reason.to_string());
    }

    /// Record a "nothing to send" cycle (empty buffer, not an error)
    pub fn record_skip(&self) {
        self.cycles_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn last_success_ms(&self) -> u64 {
        self.last_success_ms.load(Ordering::Relaxed)
    }

    pub fn last_error(&self) -> Option<String> {
        self.last_error.read().clone()
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            last_success_ms: self.last_success_ms.load(Ordering::Relaxed),
            last_sent: self.last_sent.load(Ordering::Relaxed),
            cycles_skipped: self.cycles_skipped.load(Ordering::Relaxed),
            cycles_failed: self.cycles_failed.load(Ordering::Relaxed),
            last_error: self.last_error.read().clone(),
        }
    }
}

fn epoch_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
