//! Change-feed trigger: turns inventory events into sweep requests.

use tokio::sync::broadcast::error::RecvError;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use dormhub_core::events::EventBus;

use crate::queue::{SweepQueue, SweepReason};

/// Requests a sweep whenever an event may let a pending registrant through.
///
/// The trigger never waits for the sweep itself.
#[derive(Debug, Clone)]
pub struct ChangeFeedTrigger {
    events: EventBus,
    queue: SweepQueue,
}

impl ChangeFeedTrigger {
    /// Create a trigger.
    pub fn new(events: EventBus, queue: SweepQueue) -> Self {
        Self { events, queue }
    }

    /// Subscribe now and forward events until cancelled.
    pub fn spawn(self, mut cancel: watch::Receiver<bool>) -> JoinHandle<()> {
        let mut rx = self.events.subscribe();
        tokio::spawn(async move {
            info!("Change-feed trigger started");
            loop {
                tokio::select! {
                    changed = cancel.changed() => {
                        if changed.is_err() || *cancel.borrow() {
                            break;
                        }
                    }
                    received = rx.recv() => match received {
                        Ok(event) => {
                            if event.payload.may_unblock_pending() {
                                debug!(event_id = %event.id, "Inventory changed, requesting sweep");
                                self.queue.request(SweepReason::InventoryChange);
                            }
                        }
                        Err(RecvError::Lagged(missed)) => {
                            warn!(missed, "Change feed lagged, requesting sweep");
                            self.queue.request(SweepReason::InventoryChange);
                        }
                        Err(RecvError::Closed) => break,
                    },
                }
            }
            info!("Change-feed trigger stopped");
        })
    }
}
