//! Auto-refresh polling controller.
//!
//! Coordinates a recurring asynchronous refresh operation on a wall-clock
//! schedule: a period timer fires the operation every `interval_secs`, a
//! once-per-second ticker derives "seconds until the next automatic refresh",
//! and an in-flight guard guarantees at most one execution at a time:
//! scheduled ticks or manual triggers that arrive mid-refresh are dropped,
//! never queued. Failures are logged and swallowed; the schedule is never
//! interrupted by a failed refresh.
//!
//! Modules:
//! - `config`: construction-time defaults (`enabled`, `interval_secs`)
//! - `controller`: the [`RefreshController`] timer/guard state machine
//! - `refresher`: the injected async operation ([`Refresher`] trait)
//! - `status`: observable snapshot for display layers
//! - `metrics`: lock-free counters for refresh outcomes and dropped starts
//!
//! # Example
//!
//! ```no_run
//! use auto_refresh::{RefreshConfig, RefreshController};
//! use std::sync::Arc;
//!
//! let runtime = tokio::runtime::Runtime::new().unwrap();
//! let config = RefreshConfig::new().with_enabled(true).with_interval_secs(10);
//! let mut controller = RefreshController::new(
//!     config,
//!     Arc::new(|| async { anyhow::Ok(()) }),
//!     runtime.handle().clone(),
//! );
//!
//! controller.trigger_manual_refresh();
//! let status = controller.status();
//! println!("next refresh in {}s", status.next_refresh_in_secs);
//! ```

pub mod config;
pub mod controller;
pub mod metrics;
pub mod refresher;
pub mod status;

// Re-export main types for convenience
pub use config::{MIN_INTERVAL_SECS, RefreshConfig};
pub use controller::RefreshController;
pub use metrics::{RefreshMetrics, RefreshMetricsSnapshot};
pub use refresher::{RefreshFuture, Refresher};
pub use status::RefreshStatus;
