//! Coalescing sweep request queue.
//!
//! The queue holds at most one request. A request arriving while one is
//! already queued is folded into it; a request arriving while a sweep runs
//! queues exactly one follow-up pass.

use std::fmt;

use serde::Serialize;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};

/// Why a sweep was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepReason {
    /// Server start.
    Startup,
    /// Inventory was added or released.
    InventoryChange,
    /// Periodic schedule.
    Schedule,
    /// Operator request.
    Manual,
}

impl fmt::Display for SweepReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Startup => "startup",
            Self::InventoryChange => "inventory_change",
            Self::Schedule => "schedule",
            Self::Manual => "manual",
        };
        f.write_str(s)
    }
}

/// Result of requesting a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enqueued {
    /// A new pass was queued.
    Queued,
    /// A pass was already queued and will cover this request.
    Coalesced,
    /// No runner is consuming requests.
    Closed,
}

/// Sending half, cheap to clone.
#[derive(Debug, Clone)]
pub struct SweepQueue {
    tx: mpsc::Sender<SweepReason>,
}

/// Receiving half, owned by the runner.
#[derive(Debug)]
pub struct SweepRequests {
    rx: mpsc::Receiver<SweepReason>,
}

impl SweepQueue {
    /// Create a queue and its receiving half.
    pub fn new() -> (Self, SweepRequests) {
        let (tx, rx) = mpsc::channel(1);
        (Self { tx }, SweepRequests { rx })
    }

    /// Request a sweep without waiting.
    pub fn request(&self, reason: SweepReason) -> Enqueued {
        match self.tx.try_send(reason) {
            Ok(()) => {
                debug!(%reason, "Sweep queued");
                Enqueued::Queued
            }
            Err(TrySendError::Full(_)) => {
                debug!(%reason, "Sweep already queued, coalesced");
                Enqueued::Coalesced
            }
            Err(TrySendError::Closed(_)) => {
                warn!(%reason, "Sweep requested but no runner is active");
                Enqueued::Closed
            }
        }
    }
}

impl SweepRequests {
    /// Wait for the next request. `None` once every sender is gone.
    pub async fn next(&mut self) -> Option<SweepReason> {
        self.rx.recv().await
    }
}
