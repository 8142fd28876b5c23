//! Allocation and retry policy configuration.

use serde::{Deserialize, Serialize};

/// Allocator behaviour shared by registration and reconciliation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationConfig {
    /// Attempts per registration before contention is reported to the caller.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Backoff unit in milliseconds; attempt `n` waits `2^n` units.
    #[serde(default = "default_base_backoff_ms")]
    pub base_backoff_ms: u64,
    /// Record a pending assignment when inventory is exhausted instead of
    /// rejecting the registration.
    #[serde(default = "default_true")]
    pub allow_pending: bool,
    /// Prefix for synthesized bed labels in VIP rooms.
    #[serde(default = "default_vip_label_prefix")]
    pub vip_label_prefix: String,
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_backoff_ms: default_base_backoff_ms(),
            allow_pending: default_true(),
            vip_label_prefix: default_vip_label_prefix(),
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_backoff_ms() -> u64 {
    100
}

fn default_true() -> bool {
    true
}

fn default_vip_label_prefix() -> String {
    "VIP".to_string()
}
