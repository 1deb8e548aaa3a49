//! Observable refresh status for display layers.
//!
//! [`RefreshStatus`] is a cheap, cloneable snapshot of the controller state.
//! Display layers poll it whenever they render (immediate-mode UIs once per
//! frame) rather than subscribing to change notifications.

use chrono::{DateTime, Utc};

/// Point-in-time snapshot of a controller's refresh state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshStatus {
    /// Whether the recurring refresh timers are active.
    pub auto_refresh_enabled: bool,
    /// Seconds between automatic refreshes.
    pub interval_secs: u64,
    /// Whether a refresh (manual or automatic) is currently in flight.
    pub refreshing: bool,
    /// Wall-clock time of the last successful refresh, if any.
    pub last_refresh_at: Option<DateTime<Utc>>,
    /// Seconds until the next automatic refresh. Zero while auto-refresh is
    /// disabled or before the first successful refresh.
    pub next_refresh_in_secs: u64,
}

impl RefreshStatus {
    /// Format the last refresh time for display.
    ///
    /// Returns `"never"` before the first successful refresh.
    pub fn last_refresh_display(&self) -> String {
        match self.last_refresh_at {
            Some(ts) => ts.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => "never".to_string(),
        }
    }
}
