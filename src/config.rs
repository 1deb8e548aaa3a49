//! Auto-refresh configuration types.
//!
//! Defines the construction-time configuration for the refresh controller:
//! whether auto-refresh starts enabled and how often it fires.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Minimum allowed refresh period. Shorter intervals are clamped, not rejected.
pub const MIN_INTERVAL_SECS: u64 = 1;

// ── Serde default helpers ──────────────────────────────────────────────

fn default_interval_secs() -> u64 {
    10
}

/// Configuration for a [`RefreshController`](crate::controller::RefreshController).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RefreshConfig {
    /// Whether auto-refresh is enabled at construction (default: false)
    #[serde(default)]
    pub enabled: bool,

    /// Seconds between automatic refreshes (default: 10, minimum: 1)
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

impl RefreshConfig {
    /// Create a config with the defaults (disabled, 10 second interval).
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the enabled flag.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Override the refresh interval in seconds.
    pub fn with_interval_secs(mut self, interval_secs: u64) -> Self {
        self.interval_secs = interval_secs;
        self
    }

    /// The refresh period as a `Duration`, clamped to [`MIN_INTERVAL_SECS`].
    pub fn effective_interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(MIN_INTERVAL_SECS))
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_secs: default_interval_secs(),
        }
    }
}
