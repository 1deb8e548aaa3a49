//! The auto-refresh polling controller.
//!
//! [`RefreshController`] coordinates a recurring async refresh operation on a
//! wall-clock schedule: it owns a period timer that fires the operation every
//! `interval_secs`, a 1 Hz countdown ticker that recomputes "seconds until the
//! next automatic refresh", and an in-flight guard that drops any start
//! attempt (scheduled or manual) while an operation is still running.
//!
//! Both timers are spawned tokio tasks owned by the controller. Every
//! reconfiguration aborts them and, while enabled, spawns fresh ones; a
//! generation counter bumped before the abort guarantees that a task already
//! mid-poll can never fire a stale-period side effect afterwards.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use chrono::Utc;
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::config::{MIN_INTERVAL_SECS, RefreshConfig};
use crate::metrics::RefreshMetrics;
use crate::refresher::Refresher;
use crate::status::RefreshStatus;

/// How a refresh execution was initiated (affects logging and metrics only).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RefreshOrigin {
    /// Started by `trigger_manual_refresh`.
    Manual,
    /// Started by the period timer.
    Scheduled,
}

/// Mutable controller state, protected by a single mutex.
#[derive(Debug)]
struct RefreshState {
    /// Whether the recurring timers are active.
    enabled: bool,
    /// Period between automatic refreshes (already clamped to ≥ 1s).
    interval: Duration,
    /// Wall-clock time of the last successful refresh, for display.
    last_refresh_at: Option<chrono::DateTime<Utc>>,
    /// Monotonic companion of `last_refresh_at`; basis for countdown math.
    last_refresh_instant: Option<Instant>,
    /// Derived countdown, recomputed every second while enabled.
    next_refresh_in_secs: u64,
}

/// State shared between the controller handle and its spawned tasks.
struct ControllerInner {
    state: Mutex<RefreshState>,
    /// In-flight guard: true while a refresh execution is running.
    refreshing: AtomicBool,
    /// Generation counter. Bumped before the timer tasks are aborted on every
    /// reconfigure/teardown; a task whose captured epoch no longer matches
    /// must exit without acting.
    epoch: AtomicU64,
    refresher: Arc<dyn Refresher>,
    metrics: Arc<RefreshMetrics>,
    runtime: Handle,
}

/// Drives a recurring async refresh operation and exposes its live status.
///
/// The controller owns its two timer tasks exclusively: they are created when
/// auto-refresh is enabled and aborted on disable, reconfiguration, and
/// [`Drop`]. A refresh execution already in flight when the controller is
/// dropped runs to completion, but its completion becomes a no-op.
///
/// The injected [`Refresher`] is opaque to the controller; only its
/// settlement (success or failure) and timing matter. Failures are logged and
/// swallowed; they never stop the schedule and never advance the
/// last-refresh timestamp.
pub struct RefreshController {
    inner: Arc<ControllerInner>,
    period_task: Option<JoinHandle<()>>,
    countdown_task: Option<JoinHandle<()>>,
}

impl RefreshController {
    /// Create a controller from construction-time defaults.
    ///
    /// Timers start immediately when `config.enabled` is true. The runtime
    /// handle is taken explicitly because the expected caller is a display
    /// layer running outside the tokio runtime.
    pub fn new(config: RefreshConfig, refresher: Arc<dyn Refresher>, runtime: Handle) -> Self {
        let inner = Arc::new(ControllerInner {
            state: Mutex::new(RefreshState {
                enabled: false,
                interval: config.effective_interval(),
                last_refresh_at: None,
                last_refresh_instant: None,
                next_refresh_in_secs: 0,
            }),
            refreshing: AtomicBool::new(false),
            epoch: AtomicU64::new(0),
            refresher,
            metrics: Arc::new(RefreshMetrics::default()),
            runtime,
        });

        let mut controller = Self {
            inner,
            period_task: None,
            countdown_task: None,
        };
        if config.enabled {
            controller.configure(true, config.interval_secs);
        }
        controller
    }

    /// Set enablement and period in one call, resetting the timers.
    ///
    /// Always cancels the current timer tasks; while enabled, respawns both
    /// fresh from the call instant, so the next automatic refresh fires one
    /// full (new) period later, never immediately and never on the stale
    /// period. `interval_secs` is clamped to [`MIN_INTERVAL_SECS`].
    pub fn configure(&mut self, enabled: bool, interval_secs: u64) {
        let interval = Duration::from_secs(interval_secs.max(MIN_INTERVAL_SECS));

        // Invalidate before aborting: a timer task that already dequeued a
        // tick sees the epoch mismatch and exits without firing.
        self.inner.epoch.fetch_add(1, Ordering::SeqCst);
        if let Some(handle) = self.period_task.take() {
            handle.abort();
        }
        if let Some(handle) = self.countdown_task.take() {
            handle.abort();
        }

        {
            let mut state = self.inner.state.lock();
            state.enabled = enabled;
            state.interval = interval;
            state.next_refresh_in_secs = remaining_secs(&state);
        }

        if enabled {
            let epoch = self.inner.epoch.load(Ordering::SeqCst);
            let period = Arc::downgrade(&self.inner);
            let countdown = Arc::downgrade(&self.inner);
            self.period_task = Some(
                self.inner
                    .runtime
                    .spawn(async move { period_loop(period, interval, epoch).await }),
            );
            self.countdown_task = Some(
                self.inner
                    .runtime
                    .spawn(async move { countdown_loop(countdown, epoch).await }),
            );
        }

        log::debug!(
            "Auto-refresh configured: enabled={} interval={}s",
            enabled,
            interval.as_secs()
        );
    }

    /// Enable or disable auto-refresh, keeping the current period.
    ///
    /// No-op when the value is unchanged, so incidental re-sets from a
    /// display layer do not reset a running timer.
    pub fn set_auto_refresh_enabled(&mut self, enabled: bool) {
        let interval_secs = {
            let state = self.inner.state.lock();
            if state.enabled == enabled {
                return;
            }
            state.interval.as_secs()
        };
        self.configure(enabled, interval_secs);
    }

    /// Change the refresh period, keeping the current enablement.
    ///
    /// No-op when the (clamped) value is unchanged.
    pub fn set_refresh_interval(&mut self, interval_secs: u64) {
        let clamped = interval_secs.max(MIN_INTERVAL_SECS);
        let enabled = {
            let state = self.inner.state.lock();
            if state.interval.as_secs() == clamped {
                return;
            }
            state.enabled
        };
        self.configure(enabled, clamped);
    }

    /// Run the refresh operation now, regardless of enablement.
    ///
    /// No-op if a refresh is already in flight (the trigger is dropped, not
    /// queued). The operation runs on a spawned task; this call returns
    /// immediately.
    pub fn trigger_manual_refresh(&self) {
        start_refresh(&self.inner, RefreshOrigin::Manual);
    }

    /// Point-in-time snapshot of the observable state for display layers.
    #[must_use]
    pub fn status(&self) -> RefreshStatus {
        let state = self.inner.state.lock();
        RefreshStatus {
            auto_refresh_enabled: state.enabled,
            interval_secs: state.interval.as_secs(),
            refreshing: self.inner.refreshing.load(Ordering::SeqCst),
            last_refresh_at: state.last_refresh_at,
            next_refresh_in_secs: state.next_refresh_in_secs,
        }
    }

    /// Shared counters recording refresh outcomes and dropped start attempts.
    #[must_use]
    pub fn metrics(&self) -> &Arc<RefreshMetrics> {
        &self.inner.metrics
    }
}

impl Drop for RefreshController {
    fn drop(&mut self) {
        self.inner.epoch.fetch_add(1, Ordering::SeqCst);
        if let Some(handle) = self.period_task.take() {
            handle.abort();
        }
        if let Some(handle) = self.countdown_task.take() {
            handle.abort();
        }
    }
}

impl std::fmt::Debug for RefreshController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshController")
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}

/// Seconds until the next automatic refresh, derived from the last success.
///
/// Zero while disabled or before the first successful refresh; clamped at
/// zero once a full period has elapsed.
fn remaining_secs(state: &RefreshState) -> u64 {
    if !state.enabled {
        return 0;
    }
    match state.last_refresh_instant {
        Some(at) => state.interval.as_secs().saturating_sub(at.elapsed().as_secs()),
        None => 0,
    }
}

/// Start a refresh execution unless one is already in flight.
///
/// The loser of the compare-exchange is counted and discarded (drop, not
/// queue). The winner runs the operation on a spawned task holding only a
/// weak reference to the controller state, so a controller dropped mid-flight
/// turns the completion into a no-op.
fn start_refresh(inner: &Arc<ControllerInner>, origin: RefreshOrigin) {
    if inner
        .refreshing
        .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
        .is_err()
    {
        match origin {
            RefreshOrigin::Manual => {
                inner.metrics.manual_dropped.fetch_add(1, Ordering::Relaxed);
                log::debug!("Manual refresh ignored: a refresh is already in flight");
            }
            RefreshOrigin::Scheduled => {
                inner.metrics.ticks_dropped.fetch_add(1, Ordering::Relaxed);
                log::debug!("Scheduled refresh tick dropped: a refresh is already in flight");
            }
        }
        return;
    }

    inner.metrics.refreshes_started.fetch_add(1, Ordering::Relaxed);
    log::trace!("Refresh started ({origin:?})");

    let refresher = Arc::clone(&inner.refresher);
    let weak = Arc::downgrade(inner);
    let handle = inner.runtime.clone();
    inner.runtime.spawn(async move {
        // Run the operation on its own task so a panic inside it settles as
        // a JoinError instead of killing the completion bookkeeping.
        let outcome = handle.spawn(async move { refresher.refresh().await }).await;

        let Some(inner) = weak.upgrade() else {
            return; // Controller dropped mid-flight
        };

        match outcome {
            Ok(Ok(())) => {
                let now_wall = Utc::now();
                let now_mono = Instant::now();
                {
                    let mut state = inner.state.lock();
                    state.last_refresh_at =
                        Some(state.last_refresh_at.map_or(now_wall, |prev| prev.max(now_wall)));
                    state.last_refresh_instant = Some(now_mono);
                    state.next_refresh_in_secs = remaining_secs(&state);
                }
                inner.metrics.refreshes_succeeded.fetch_add(1, Ordering::Relaxed);
                log::debug!("Refresh completed");
            }
            Ok(Err(e)) => {
                inner.metrics.refreshes_failed.fetch_add(1, Ordering::Relaxed);
                log::warn!("Refresh failed: {e:#}");
            }
            Err(e) => {
                inner.metrics.refreshes_failed.fetch_add(1, Ordering::Relaxed);
                log::error!("Refresh task panicked: {e}");
            }
        }

        inner.refreshing.store(false, Ordering::SeqCst);
    });
}

/// Period timer: fires one refresh attempt every `period` while current.
async fn period_loop(weak: std::sync::Weak<ControllerInner>, period: Duration, epoch: u64) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    ticker.tick().await; // Skip first immediate tick
    loop {
        ticker.tick().await;
        let Some(inner) = weak.upgrade() else {
            break;
        };
        if inner.epoch.load(Ordering::SeqCst) != epoch {
            break; // Reconfigured since spawn; a newer task owns the schedule
        }
        start_refresh(&inner, RefreshOrigin::Scheduled);
    }
}

/// Countdown ticker: recomputes the derived countdown once per second.
///
/// Read-and-derive only; never initiates a refresh and never touches the
/// refresh timestamps.
async fn countdown_loop(weak: std::sync::Weak<ControllerInner>, epoch: u64) {
    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        ticker.tick().await;
        let Some(inner) = weak.upgrade() else {
            break;
        };
        if inner.epoch.load(Ordering::SeqCst) != epoch {
            break;
        }
        let mut state = inner.state.lock();
        state.next_refresh_in_secs = remaining_secs(&state);
    }
}
