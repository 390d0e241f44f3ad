//! Service configuration.

use tally_events::DispatchConfig;

/// Environment variable for the monitor worker count.
pub const ENV_MONITOR_WORKERS: &str = "TALLY_MONITOR_WORKERS";
/// Environment variable for the monitor pool name (thread names, log field).
pub const ENV_MONITOR_POOL_NAME: &str = "TALLY_MONITOR_POOL_NAME";

/// Transaction service configuration.
#[derive(Debug, Clone, Default)]
pub struct LedgerConfig {
    /// Monitor dispatch pool settings.
    pub dispatch: DispatchConfig,
}

impl LedgerConfig {
    pub fn with_monitor_workers(mut self, workers: usize) -> Self {
        self.dispatch = self.dispatch.with_workers(workers);
        self
    }

    pub fn with_monitor_pool_name(mut self, name: impl Into<String>) -> Self {
        self.dispatch = self.dispatch.with_name(name);
        self
    }

    /// Defaults overridden by `TALLY_*` environment variables.
    ///
    /// Unparseable values are ignored with a warning.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_MONITOR_WORKERS) {
            match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => config = config.with_monitor_workers(n),
                _ => tracing::warn!(
                    var = ENV_MONITOR_WORKERS,
                    value = %raw,
                    default = config.dispatch.workers,
                    "invalid monitor worker count; using default"
                ),
            }
        }

        if let Some(name) = lookup(ENV_MONITOR_POOL_NAME).filter(|n| !n.trim().is_empty()) {
            config = config.with_monitor_pool_name(name);
        }

        config
    }
}
