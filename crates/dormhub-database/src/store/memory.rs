//! In-process inventory store.
//!
//! All state sits behind one Tokio mutex that each operation holds for its
//! whole duration, so every commit re-validates and applies its writes with
//! no other writer interleaved. Suitable for single-node deployments and
//! tests; state is lost on restart.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use dormhub_core::error::AppError;
use dormhub_core::types::{Gender, RegistrantId, RoomId, TagId};
use dormhub_entity::registrant::{IdentityUpdate, Registrant};
use dormhub_entity::room::{NewRoom, Room, bed_label, sort_by_completion_priority};
use dormhub_entity::tag::{NewTag, Tag, sort_by_tag_number};

use super::{
    CommittedRegistration, InventoryStore, PairingOutcome, RegistrationPlan, ReleaseReport,
};

#[derive(Debug, Default)]
struct Inventory {
    rooms: HashMap<RoomId, Room>,
    tags: HashMap<TagId, Tag>,
    /// Insertion order doubles as creation order.
    registrants: Vec<Registrant>,
}

impl Inventory {
    fn registrant_mut(&mut self, id: RegistrantId) -> Option<&mut Registrant> {
        self.registrants.iter_mut().find(|r| r.id == id)
    }

    /// Take one bed from `id`. Returns the label for the taken bed.
    fn claim_bed(&mut self, id: RoomId, vip_prefix: &str) -> Option<(Room, String)> {
        let room = self.rooms.get_mut(&id).filter(|r| r.has_vacancy())?;
        let label = bed_label(room, vip_prefix);
        let now = Utc::now();
        room.available_beds -= 1;
        room.last_assigned = Some(now);
        room.updated_at = now;
        Some((room.clone(), label))
    }

    fn claim_tag(&mut self, id: TagId, holder: RegistrantId) -> Option<Tag> {
        let tag = self.tags.get_mut(&id).filter(|t| !t.is_assigned)?;
        let now = Utc::now();
        tag.is_assigned = true;
        tag.assigned_user_id = Some(holder);
        tag.assigned_at = Some(now);
        tag.updated_at = now;
        Some(tag.clone())
    }
}

/// Inventory store held in process memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryInventoryStore {
    inner: Arc<Mutex<Inventory>>,
}

impl MemoryInventoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl InventoryStore for MemoryInventoryStore {
    async fn find_room(&self, id: RoomId) -> Result<Option<Room>, AppError> {
        Ok(self.inner.lock().await.rooms.get(&id).cloned())
    }

    async fn find_tag(&self, id: TagId) -> Result<Option<Tag>, AppError> {
        Ok(self.inner.lock().await.tags.get(&id).cloned())
    }

    async fn find_registrant(&self, id: RegistrantId) -> Result<Option<Registrant>, AppError> {
        let inv = self.inner.lock().await;
        Ok(inv.registrants.iter().find(|r| r.id == id).cloned())
    }

    async fn list_rooms(&self) -> Result<Vec<Room>, AppError> {
        let mut rooms: Vec<Room> = self.inner.lock().await.rooms.values().cloned().collect();
        rooms.sort_by(|a, b| a.room_number.cmp(&b.room_number));
        Ok(rooms)
    }

    async fn list_tags(&self) -> Result<Vec<Tag>, AppError> {
        let mut tags: Vec<Tag> = self.inner.lock().await.tags.values().cloned().collect();
        sort_by_tag_number(&mut tags);
        Ok(tags)
    }

    async fn list_registrants(&self) -> Result<Vec<Registrant>, AppError> {
        Ok(self.inner.lock().await.registrants.clone())
    }

    async fn available_rooms(&self, genders: &[Gender]) -> Result<Vec<Room>, AppError> {
        let mut rooms: Vec<Room> = self
            .inner
            .lock()
            .await
            .rooms
            .values()
            .filter(|r| r.has_vacancy() && genders.contains(&r.gender))
            .cloned()
            .collect();
        sort_by_completion_priority(&mut rooms);
        Ok(rooms)
    }

    async fn unassigned_tags(&self) -> Result<Vec<Tag>, AppError> {
        let mut tags: Vec<Tag> = self
            .inner
            .lock()
            .await
            .tags
            .values()
            .filter(|t| !t.is_assigned)
            .cloned()
            .collect();
        sort_by_tag_number(&mut tags);
        Ok(tags)
    }

    async fn pending_for_room(&self, gender: Gender) -> Result<Vec<Registrant>, AppError> {
        let inv = self.inner.lock().await;
        Ok(inv
            .registrants
            .iter()
            .filter(|r| r.gender == gender && r.is_room_pending())
            .cloned()
            .collect())
    }

    async fn pending_for_tag(&self) -> Result<Vec<Registrant>, AppError> {
        let inv = self.inner.lock().await;
        Ok(inv
            .registrants
            .iter()
            .filter(|r| r.is_tag_pending())
            .cloned()
            .collect())
    }

    async fn insert_rooms(&self, rooms: Vec<NewRoom>) -> Result<Vec<Room>, AppError> {
        let mut inv = self.inner.lock().await;
        let now = Utc::now();
        let rooms: Vec<Room> = rooms
            .into_iter()
            .map(|r| r.into_room(RoomId::new(), now))
            .collect();

        for (i, room) in rooms.iter().enumerate() {
            let clashes_stored = inv
                .rooms
                .values()
                .any(|r| r.room_number == room.room_number);
            let clashes_batch = rooms[..i]
                .iter()
                .any(|r| r.room_number == room.room_number);
            if clashes_stored || clashes_batch {
                return Err(AppError::validation(format!(
                    "Room number '{}' already exists",
                    room.room_number
                )));
            }
        }

        for room in &rooms {
            inv.rooms.insert(room.id, room.clone());
        }
        Ok(rooms)
    }

    async fn insert_tags(&self, tags: Vec<NewTag>) -> Result<Vec<Tag>, AppError> {
        let mut inv = self.inner.lock().await;
        let now = Utc::now();
        let tags: Vec<Tag> = tags
            .into_iter()
            .map(|t| t.into_tag(TagId::new(), now))
            .collect();

        for (i, tag) in tags.iter().enumerate() {
            let clashes_stored = inv.tags.values().any(|t| t.tag_number == tag.tag_number);
            let clashes_batch = tags[..i].iter().any(|t| t.tag_number == tag.tag_number);
            if clashes_stored || clashes_batch {
                return Err(AppError::validation(format!(
                    "Tag number '{}' already exists",
                    tag.tag_number
                )));
            }
        }

        for tag in &tags {
            inv.tags.insert(tag.id, tag.clone());
        }
        Ok(tags)
    }

    async fn commit_registration(
        &self,
        plan: RegistrationPlan,
    ) -> Result<CommittedRegistration, AppError> {
        let mut inv = self.inner.lock().await;

        // Validate everything before the first write.
        if let Some(room_id) = plan.room_id {
            if !inv.rooms.get(&room_id).is_some_and(Room::has_vacancy) {
                return Err(AppError::conflict(format!("Room {room_id} has no free bed")));
            }
        }
        if let Some(tag_id) = plan.tag_id {
            if !inv.tags.get(&tag_id).is_some_and(|t| !t.is_assigned) {
                return Err(AppError::conflict(format!("Tag {tag_id} is already assigned")));
            }
        }

        let now = Utc::now();
        let id = RegistrantId::new();
        let mut registrant = plan.registrant.into_registrant(id, now);

        let room = match plan.room_id {
            Some(room_id) => {
                let (room, label) = inv
                    .claim_bed(room_id, &plan.vip_label_prefix)
                    .ok_or_else(|| AppError::internal("Validated room vanished"))?;
                registrant.record_room(&room.wing, &room.room_number, label, now);
                Some(room)
            }
            None => None,
        };
        let tag = match plan.tag_id {
            Some(tag_id) => {
                let tag = inv
                    .claim_tag(tag_id, id)
                    .ok_or_else(|| AppError::internal("Validated tag vanished"))?;
                registrant.record_tag(&tag.tag_number, now);
                Some(tag)
            }
            None => None,
        };

        inv.registrants.push(registrant.clone());
        Ok(CommittedRegistration {
            registrant,
            room,
            tag,
        })
    }

    async fn assign_room(
        &self,
        registrant_id: RegistrantId,
        room_id: RoomId,
        vip_label_prefix: &str,
    ) -> Result<PairingOutcome, AppError> {
        let mut inv = self.inner.lock().await;

        if !inv
            .registrant_mut(registrant_id)
            .is_some_and(|r| r.is_room_pending())
        {
            return Ok(PairingOutcome::RegistrantSettled);
        }
        let Some((room, label)) = inv.claim_bed(room_id, vip_label_prefix) else {
            debug!(%room_id, "Room filled before pairing");
            return Ok(PairingOutcome::ResourceTaken);
        };

        let registrant = inv
            .registrant_mut(registrant_id)
            .ok_or_else(|| AppError::internal("Locked registrant vanished"))?;
        registrant.record_room(&room.wing, &room.room_number, label, Utc::now());
        Ok(PairingOutcome::Assigned(registrant.clone()))
    }

    async fn assign_tag(
        &self,
        registrant_id: RegistrantId,
        tag_id: TagId,
    ) -> Result<PairingOutcome, AppError> {
        let mut inv = self.inner.lock().await;

        if !inv
            .registrant_mut(registrant_id)
            .is_some_and(|r| r.is_tag_pending())
        {
            return Ok(PairingOutcome::RegistrantSettled);
        }
        let Some(tag) = inv.claim_tag(tag_id, registrant_id) else {
            debug!(%tag_id, "Tag taken before pairing");
            return Ok(PairingOutcome::ResourceTaken);
        };

        let registrant = inv
            .registrant_mut(registrant_id)
            .ok_or_else(|| AppError::internal("Locked registrant vanished"))?;
        registrant.record_tag(&tag.tag_number, Utc::now());
        Ok(PairingOutcome::Assigned(registrant.clone()))
    }

    async fn update_identity(
        &self,
        id: RegistrantId,
        update: &IdentityUpdate,
    ) -> Result<Option<Registrant>, AppError> {
        let mut inv = self.inner.lock().await;
        Ok(inv.registrant_mut(id).map(|r| {
            update.apply(r, Utc::now());
            r.clone()
        }))
    }

    async fn release_registrant(
        &self,
        id: RegistrantId,
    ) -> Result<Option<ReleaseReport>, AppError> {
        let mut inv = self.inner.lock().await;
        let Some(position) = inv.registrants.iter().position(|r| r.id == id) else {
            return Ok(None);
        };
        let registrant = inv.registrants.remove(position);
        let now = Utc::now();

        let room_gender = match registrant.room_number.as_deref() {
            Some(room_number) => {
                let room = inv.rooms.values_mut().find(|r| {
                    r.room_number == room_number && r.available_beds < r.total_beds
                });
                match room {
                    Some(room) => {
                        room.available_beds += 1;
                        room.updated_at = now;
                        Some(room.gender)
                    }
                    None => {
                        warn!(
                            registrant_id = %id,
                            room_number,
                            "Room missing or already empty on release"
                        );
                        None
                    }
                }
            }
            None => None,
        };

        let tag_released = match registrant.tag_number.as_deref() {
            Some(tag_number) => {
                let tag = inv
                    .tags
                    .values_mut()
                    .find(|t| t.tag_number == tag_number && t.is_assigned);
                match tag {
                    Some(tag) => {
                        tag.is_assigned = false;
                        tag.assigned_user_id = None;
                        tag.assigned_at = None;
                        tag.updated_at = now;
                        true
                    }
                    None => {
                        warn!(
                            registrant_id = %id,
                            tag_number,
                            "Tag missing or not assigned on release"
                        );
                        false
                    }
                }
            }
            None => false,
        };

        Ok(Some(ReleaseReport {
            registrant,
            room_released: room_gender.is_some(),
            room_gender,
            tag_released,
        }))
    }

    async fn health_check(&self) -> Result<bool, AppError> {
        Ok(true)
    }
}
