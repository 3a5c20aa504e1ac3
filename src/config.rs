use std::path::PathBuf;
use std::time::Duration;

use crate::explorer::{ExplorerDefaults, SortDirection, METRICS};

/// Configuration loaded from environment variables.
#[derive(Clone, Debug, PartialEq)]
pub struct DashboardConfig {
    // UI
    pub tick_ms: u64,
    /// Log file used while the terminal UI owns the screen.
    pub log_file: PathBuf,

    // Explorer controls, initial values
    pub metric: String,
    pub min_trades: u32,
    pub sort: SortDirection,
    pub min_trades_step: u32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            tick_ms: 100,
            log_file: PathBuf::from("dashboard.log"),
            metric: METRICS[0].to_string(),
            min_trades: 0,
            sort: SortDirection::Desc,
            min_trades_step: 1,
        }
    }
}

impl DashboardConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset or unparseable values keep their default.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            tick_ms: get("DASH_TICK_MS")
                .and_then(|s| s.parse().ok())
                .filter(|ms| *ms > 0)
                .unwrap_or(defaults.tick_ms),
            log_file: get("DASH_LOG_FILE")
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.log_file),
            metric: get("DASH_METRIC")
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(defaults.metric),
            min_trades: get("DASH_MIN_TRADES")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.min_trades),
            sort: get("DASH_SORT")
                .and_then(|s| SortDirection::parse(&s))
                .unwrap_or(defaults.sort),
            min_trades_step: get("DASH_MIN_TRADES_STEP")
                .and_then(|s| s.parse().ok())
                .filter(|step| *step > 0)
                .unwrap_or(defaults.min_trades_step),
        }
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn explorer_defaults(&self) -> ExplorerDefaults {
        ExplorerDefaults {
            metric: self.metric.clone(),
            min_trades: self.min_trades,
            sort: self.sort,
            min_trades_step: self.min_trades_step,
        }
    }
}
