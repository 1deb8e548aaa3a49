//! Lock-free counters for refresh telemetry.
//!
//! The drop-not-queue policy silently lengthens the effective period when the
//! refresh operation is slow; `ticks_dropped` makes that visible without
//! changing the scheduling behavior.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters updated by the controller as refreshes run.
#[derive(Debug, Default)]
pub struct RefreshMetrics {
    /// Refresh executions started (manual or automatic).
    pub refreshes_started: AtomicU64,
    /// Refresh executions that settled successfully.
    pub refreshes_succeeded: AtomicU64,
    /// Refresh executions that settled with an error or panic.
    pub refreshes_failed: AtomicU64,
    /// Scheduled ticks dropped because a refresh was already in flight.
    pub ticks_dropped: AtomicU64,
    /// Manual triggers dropped because a refresh was already in flight.
    pub manual_dropped: AtomicU64,
}

impl RefreshMetrics {
    /// Snapshot of the current counters.
    #[must_use]
    pub fn snapshot(&self) -> RefreshMetricsSnapshot {
        RefreshMetricsSnapshot {
            refreshes_started: self.refreshes_started.load(Ordering::Relaxed),
            refreshes_succeeded: self.refreshes_succeeded.load(Ordering::Relaxed),
            refreshes_failed: self.refreshes_failed.load(Ordering::Relaxed),
            ticks_dropped: self.ticks_dropped.load(Ordering::Relaxed),
            manual_dropped: self.manual_dropped.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`RefreshMetrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshMetricsSnapshot {
    /// Refresh executions started (manual or automatic).
    pub refreshes_started: u64,
    /// Refresh executions that settled successfully.
    pub refreshes_succeeded: u64,
    /// Refresh executions that settled with an error or panic.
    pub refreshes_failed: u64,
    /// Scheduled ticks dropped because a refresh was already in flight.
    pub ticks_dropped: u64,
    /// Manual triggers dropped because a refresh was already in flight.
    pub manual_dropped: u64,
}
