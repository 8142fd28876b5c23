//! Reconciliation worker configuration.

use serde::{Deserialize, Serialize};

/// Background reconciliation worker configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Whether the worker is enabled.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Run a sweep whenever inventory changes.
    #[serde(default = "default_true")]
    pub sweep_on_change: bool,
    /// Cron expression (with seconds) for the periodic safety-net sweep.
    /// Empty disables the schedule.
    #[serde(default = "default_sweep_schedule")]
    pub sweep_schedule: String,
    /// Seconds to wait for an in-flight sweep during shutdown.
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_seconds: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            sweep_on_change: default_true(),
            sweep_schedule: default_sweep_schedule(),
            shutdown_timeout_seconds: default_shutdown_timeout(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_sweep_schedule() -> String {
    "0 */5 * * * *".to_string()
}

fn default_shutdown_timeout() -> u64 {
    30
}
