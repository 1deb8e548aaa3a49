//! Shared integration test helpers for the auto-refresh test suite.
//!
//! Provides the canonical stub refresher and paused-clock helpers used
//! across the `tests/` integration test files.
//!
//! Note: Rust integration tests use `mod common;` (not `use`) to bring in
//! helpers from `tests/common/mod.rs`. The `#[allow(dead_code)]` attribute
//! suppresses warnings when only a subset of helpers are used per file.

#![allow(dead_code)]

use auto_refresh::{RefreshConfig, RefreshController, RefreshFuture, Refresher};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Counting stub refresher with configurable delay and failure schedule.
///
/// Call numbers are 1-based and counted when the operation starts, so
/// `calls()` equals the number of refresh executions the controller let
/// through the in-flight guard.
pub struct StubRefresher {
    calls: AtomicUsize,
    delay: Duration,
    fail_when: Box<dyn Fn(usize) -> bool + Send + Sync>,
}

impl StubRefresher {
    /// Succeeds instantly on every call.
    pub fn ok() -> Arc<Self> {
        Self::with_behavior(Duration::ZERO, |_| false)
    }

    /// Fails instantly on every call.
    pub fn failing() -> Arc<Self> {
        Self::with_behavior(Duration::ZERO, |_| true)
    }

    /// Succeeds after sleeping `delay` (requires advancing the paused clock).
    pub fn slow(delay: Duration) -> Arc<Self> {
        Self::with_behavior(delay, |_| false)
    }

    /// Instant settlement; `fail_when(call_number)` decides the outcome.
    pub fn fail_when(fail_when: impl Fn(usize) -> bool + Send + Sync + 'static) -> Arc<Self> {
        Self::with_behavior(Duration::ZERO, fail_when)
    }

    pub fn with_behavior(
        delay: Duration,
        fail_when: impl Fn(usize) -> bool + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            delay,
            fail_when: Box::new(fail_when),
        })
    }

    /// Number of refresh executions started so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Refresher for StubRefresher {
    fn refresh(&self) -> RefreshFuture<'_> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let fail = (self.fail_when)(call);
        let delay = self.delay;
        Box::pin(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            if fail {
                Err(anyhow::anyhow!("stub refresh failure on call {call}"))
            } else {
                Ok(())
            }
        })
    }
}

/// Build a controller on the current test runtime and let its freshly
/// spawned timer tasks register their intervals before the clock moves.
///
/// Tests that reconfigure mid-run must call [`settle`] after the
/// reconfiguration for the same reason: the new timer tasks anchor their
/// period at the instant they first run.
pub async fn controller(config: RefreshConfig, refresher: Arc<StubRefresher>) -> RefreshController {
    let controller = RefreshController::new(config, refresher, tokio::runtime::Handle::current());
    settle().await;
    controller
}

/// Config shorthand used by most timing tests.
pub fn enabled_config(interval_secs: u64) -> RefreshConfig {
    RefreshConfig::new()
        .with_enabled(true)
        .with_interval_secs(interval_secs)
}

/// Let spawned tasks run to quiescence without moving the paused clock.
pub async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

/// Advance the paused clock one second at a time, letting every timer tick
/// and spawned task run in order. One-second steps keep tick processing
/// deterministic across the period timer and the countdown ticker.
pub async fn advance_secs(secs: u64) {
    for _ in 0..secs {
        tokio::time::advance(Duration::from_secs(1)).await;
        settle().await;
    }
}
