//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{AppError, AppResult};
use pulse_core::ExecutorKind;
use pulse_monitor::MonitorConfig;

/// Construction options for the action interface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterfaceConfig {
    /// Confirmation deadline per action (ms). Default: 2000.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Rolling latency window size. Default: 100 samples.
    #[serde(default = "default_latency_window")]
    pub latency_window: usize,
    /// Timeout sweep interval (ms), normally the game's tick period.
    /// Default: 250.
    #[serde(default = "default_sweep_interval_ms")]
    pub sweep_interval_ms: u64,
}

fn default_timeout_ms() -> u64 {
    2_000
}

fn default_latency_window() -> usize {
    100
}

fn default_sweep_interval_ms() -> u64 {
    250
}

impl Default for InterfaceConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            latency_window: default_latency_window(),
            sweep_interval_ms: default_sweep_interval_ms(),
        }
    }
}

impl InterfaceConfig {
    /// Monitor configuration derived from these options.
    #[must_use]
    pub fn monitor_config(&self) -> MonitorConfig {
        MonitorConfig {
            timeout_ms: self.timeout_ms,
            sweep_interval_ms: self.sweep_interval_ms,
        }
    }
}

/// Top-level bot configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// Which execution back-end to run. Default: simulated.
    #[serde(default = "default_executor_kind")]
    pub executor: ExecutorKind,
    /// Interface options.
    #[serde(default)]
    pub interface: InterfaceConfig,
    /// Directory for the action log. Default: `data/actions`.
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
}

fn default_executor_kind() -> ExecutorKind {
    ExecutorKind::Simulated
}

fn default_log_dir() -> String {
    "data/actions".to_string()
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            executor: default_executor_kind(),
            interface: InterfaceConfig::default(),
            log_dir: default_log_dir(),
        }
    }
}

impl BotConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        toml::from_str(&contents).map_err(|e| AppError::Config(e.to_string()))
    }
}
