use std::time::Duration;

/// Configuration for query monitoring.
///
/// By default, monitoring is disabled and must be explicitly enabled.
/// Hooks run regardless of this setting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonitorConfig {
    /// Slow query threshold for alerting.
    pub slow_query_threshold: Option<Duration>,
    /// Whether monitoring is enabled.
    pub monitoring_enabled: bool,
}

impl MonitorConfig {
    /// Create a new configuration with defaults (monitoring disabled, no threshold).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the slow query threshold.
    ///
    /// Statements exceeding this duration will trigger `on_slow_query` callbacks.
    pub fn with_slow_query_threshold(mut self, threshold: Duration) -> Self {
        self.slow_query_threshold = Some(threshold);
        self
    }

    /// Enable monitoring.
    pub fn enable_monitoring(mut self) -> Self {
        self.monitoring_enabled = true;
        self
    }

    /// Disable monitoring.
    pub fn disable_monitoring(mut self) -> Self {
        self.monitoring_enabled = false;
        self
    }

    pub(crate) fn is_slow(&self, duration: Duration) -> bool {
        self.slow_query_threshold.is_some_and(|t| duration > t)
    }
}
