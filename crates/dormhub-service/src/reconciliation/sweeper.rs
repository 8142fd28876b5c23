//! Reconciliation sweep over pending registrants.
//!
//! Each pass pairs pending registrants, oldest first, with inventory in the
//! same order the allocator uses. Every pairing is its own transaction that
//! re-checks both sides; a pairing lost to a concurrent writer is skipped and
//! left for the next pass.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use dormhub_core::error::AppError;
use dormhub_core::events::{EventBus, InventoryEvent};
use dormhub_core::types::Gender;
use dormhub_database::store::{InventoryStore, PairingOutcome};
use dormhub_entity::registrant::Registrant;

/// What one sweep pass changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    /// Beds assigned to room-pending registrants.
    pub rooms_assigned: usize,
    /// Tags assigned to tag-pending registrants.
    pub tags_assigned: usize,
    /// Pairings abandoned because the resource or registrant moved on.
    pub skipped: usize,
}

impl SweepReport {
    /// Whether the pass mutated nothing.
    pub fn is_noop(&self) -> bool {
        self.rooms_assigned == 0 && self.tags_assigned == 0
    }
}

/// Pairs pending registrants with free beds and unassigned tags.
#[derive(Debug, Clone)]
pub struct Sweeper {
    store: Arc<dyn InventoryStore>,
    events: EventBus,
    vip_label_prefix: String,
}

impl Sweeper {
    /// Create a sweeper.
    pub fn new(store: Arc<dyn InventoryStore>, events: EventBus, vip_label_prefix: String) -> Self {
        Self {
            store,
            events,
            vip_label_prefix,
        }
    }

    /// Run one full pass: rooms per gender, then tags.
    pub async fn sweep(&self) -> Result<SweepReport, AppError> {
        let mut report = SweepReport::default();

        for gender in Gender::ALL {
            self.sweep_rooms(gender, &mut report).await?;
        }
        self.sweep_tags(&mut report).await?;

        if report.is_noop() {
            debug!(skipped = report.skipped, "Sweep found nothing to assign");
        } else {
            info!(
                rooms_assigned = report.rooms_assigned,
                tags_assigned = report.tags_assigned,
                skipped = report.skipped,
                "Sweep completed"
            );
        }
        Ok(report)
    }

    async fn sweep_rooms(&self, gender: Gender, report: &mut SweepReport) -> Result<(), AppError> {
        let pending = self.store.pending_for_room(gender).await?;
        if pending.is_empty() {
            return Ok(());
        }
        let mut rooms = self.store.available_rooms(&[gender]).await?;

        for registrant in pending {
            // Local counters only steer the loop; the store re-checks.
            let Some(room) = rooms.iter_mut().find(|r| r.has_vacancy()) else {
                break;
            };

            let outcome = self
                .store
                .assign_room(registrant.id, room.id, &self.vip_label_prefix)
                .await;
            match skip_contention(outcome, &registrant)? {
                Some(PairingOutcome::Assigned(updated)) => {
                    room.available_beds -= 1;
                    report.rooms_assigned += 1;
                    debug!(
                        registrant_id = %updated.id,
                        room_number = %room.room_number,
                        bed_number = updated.bed_number.as_deref().unwrap_or("-"),
                        "Pending room assigned"
                    );
                    self.events.publish(InventoryEvent::PendingResolved {
                        registrant_id: updated.id,
                        gender,
                        room_assigned: true,
                        room_gender: Some(room.gender),
                        tag_assigned: false,
                    });
                }
                Some(PairingOutcome::ResourceTaken) => {
                    room.available_beds = 0;
                    report.skipped += 1;
                }
                Some(PairingOutcome::RegistrantSettled) | None => report.skipped += 1,
            }
        }
        Ok(())
    }

    async fn sweep_tags(&self, report: &mut SweepReport) -> Result<(), AppError> {
        let pending = self.store.pending_for_tag().await?;
        if pending.is_empty() {
            return Ok(());
        }
        let mut tags = self.store.unassigned_tags().await?.into_iter();
        let mut next_tag = tags.next();

        for registrant in pending {
            let Some(tag) = next_tag.as_ref() else {
                break;
            };

            let outcome = self.store.assign_tag(registrant.id, tag.id).await;
            match skip_contention(outcome, &registrant)? {
                Some(PairingOutcome::Assigned(updated)) => {
                    report.tags_assigned += 1;
                    debug!(
                        registrant_id = %updated.id,
                        tag_number = %tag.tag_number,
                        "Pending tag assigned"
                    );
                    self.events.publish(InventoryEvent::PendingResolved {
                        registrant_id: updated.id,
                        gender: updated.gender,
                        room_assigned: false,
                        room_gender: None,
                        tag_assigned: true,
                    });
                    next_tag = tags.next();
                }
                Some(PairingOutcome::ResourceTaken) => {
                    report.skipped += 1;
                    next_tag = tags.next();
                }
                Some(PairingOutcome::RegistrantSettled) | None => report.skipped += 1,
            }
        }
        Ok(())
    }
}

/// Turn a contended pairing into a skip; other errors end the pass.
fn skip_contention(
    outcome: Result<PairingOutcome, AppError>,
    registrant: &Registrant,
) -> Result<Option<PairingOutcome>, AppError> {
    match outcome {
        Ok(outcome) => Ok(Some(outcome)),
        Err(err) if err.is_contention() => {
            warn!(registrant_id = %registrant.id, error = %err, "Pairing contended, skipping");
            Ok(None)
        }
        Err(err) => Err(err),
    }
}
