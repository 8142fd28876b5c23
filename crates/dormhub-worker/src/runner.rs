//! Sweep runner: executes queued sweeps one at a time.

use tokio::sync::watch;
use tracing::{error, info};

use dormhub_service::Sweeper;

use crate::queue::SweepRequests;

/// Owns the receiving side of the sweep queue. Passes never overlap.
#[derive(Debug)]
pub struct SweepRunner {
    sweeper: Sweeper,
    requests: SweepRequests,
}

impl SweepRunner {
    /// Create a runner.
    pub fn new(sweeper: Sweeper, requests: SweepRequests) -> Self {
        Self { sweeper, requests }
    }

    /// Run until `cancel` flips to `true` or every sender is dropped.
    ///
    /// Cancellation is observed between passes; a pass in progress runs
    /// to completion.
    pub async fn run(mut self, mut cancel: watch::Receiver<bool>) {
        info!("Sweep runner started");

        loop {
            let reason = tokio::select! {
                biased;
                changed = cancel.changed() => {
                    if changed.is_err() || *cancel.borrow() {
                        info!("Sweep runner received shutdown signal");
                        break;
                    }
                    continue;
                }
                next = self.requests.next() => match next {
                    Some(reason) => reason,
                    None => break,
                },
            };

            info!(%reason, "Sweep started");
            match self.sweeper.sweep().await {
                Ok(report) => info!(
                    %reason,
                    rooms_assigned = report.rooms_assigned,
                    tags_assigned = report.tags_assigned,
                    skipped = report.skipped,
                    "Sweep finished"
                ),
                Err(e) => error!(%reason, error = %e, "Sweep failed"),
            }
        }

        info!("Sweep runner shut down");
    }
}
