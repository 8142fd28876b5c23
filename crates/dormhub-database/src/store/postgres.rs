//! PostgreSQL inventory store.
//!
//! Every mutating method runs in one transaction. Bed and tag claims are
//! compare-and-swap `UPDATE ... WHERE available_beds > 0` /
//! `WHERE is_assigned = FALSE` statements; zero affected rows means a
//! concurrent writer won. Registrant rows touched by the sweeper or by
//! release are locked `FOR UPDATE` first.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tracing::{debug, warn};

use dormhub_core::error::AppError;
use dormhub_core::types::{Gender, RegistrantId, RoomId, TagId};
use dormhub_entity::registrant::{IdentityUpdate, Registrant};
use dormhub_entity::room::{NewRoom, Room, bed_label, sort_by_completion_priority};
use dormhub_entity::tag::{NewTag, Tag, sort_by_tag_number};

use crate::repositories::{RegistrantRepository, RoomRepository, TagRepository, db_error};

use super::{
    CommittedRegistration, InventoryStore, PairingOutcome, RegistrationPlan, ReleaseReport,
};

/// Inventory store backed by PostgreSQL.
#[derive(Debug, Clone)]
pub struct PgInventoryStore {
    pool: PgPool,
    rooms: RoomRepository,
    tags: TagRepository,
    registrants: RegistrantRepository,
}

impl PgInventoryStore {
    /// Create a store over an open pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            rooms: RoomRepository::new(pool.clone()),
            tags: TagRepository::new(pool.clone()),
            registrants: RegistrantRepository::new(pool.clone()),
            pool,
        }
    }

    async fn begin(&self) -> Result<sqlx::Transaction<'static, sqlx::Postgres>, AppError> {
        self.pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))
    }
}

/// The room as it was before `claimed` lost a bed.
fn state_before_claim(claimed: &Room) -> Room {
    let mut before = claimed.clone();
    before.available_beds += 1;
    before
}

#[async_trait]
impl InventoryStore for PgInventoryStore {
    async fn find_room(&self, id: RoomId) -> Result<Option<Room>, AppError> {
        self.rooms.find_by_id(id).await
    }

    async fn find_tag(&self, id: TagId) -> Result<Option<Tag>, AppError> {
        self.tags.find_by_id(id).await
    }

    async fn find_registrant(&self, id: RegistrantId) -> Result<Option<Registrant>, AppError> {
        self.registrants.find_by_id(id).await
    }

    async fn list_rooms(&self) -> Result<Vec<Room>, AppError> {
        self.rooms.find_all().await
    }

    async fn list_tags(&self) -> Result<Vec<Tag>, AppError> {
        let mut tags = self.tags.find_all().await?;
        sort_by_tag_number(&mut tags);
        Ok(tags)
    }

    async fn list_registrants(&self) -> Result<Vec<Registrant>, AppError> {
        self.registrants.find_all().await
    }

    async fn available_rooms(&self, genders: &[Gender]) -> Result<Vec<Room>, AppError> {
        let mut rooms = Vec::new();
        for gender in genders {
            rooms.extend(self.rooms.find_vacant(*gender).await?);
        }
        sort_by_completion_priority(&mut rooms);
        Ok(rooms)
    }

    async fn unassigned_tags(&self) -> Result<Vec<Tag>, AppError> {
        let mut tags = self.tags.find_unassigned().await?;
        sort_by_tag_number(&mut tags);
        Ok(tags)
    }

    async fn pending_for_room(&self, gender: Gender) -> Result<Vec<Registrant>, AppError> {
        self.registrants.find_room_pending(gender).await
    }

    async fn pending_for_tag(&self) -> Result<Vec<Registrant>, AppError> {
        self.registrants.find_tag_pending().await
    }

    async fn insert_rooms(&self, rooms: Vec<NewRoom>) -> Result<Vec<Room>, AppError> {
        let now = Utc::now();
        let mut tx = self.begin().await?;
        let mut inserted = Vec::with_capacity(rooms.len());
        for new_room in rooms {
            let room = new_room.into_room(RoomId::new(), now);
            inserted.push(RoomRepository::insert(&mut tx, &room).await?);
        }
        tx.commit()
            .await
            .map_err(db_error("Failed to commit room import"))?;
        Ok(inserted)
    }

    async fn insert_tags(&self, tags: Vec<NewTag>) -> Result<Vec<Tag>, AppError> {
        let now = Utc::now();
        let mut tx = self.begin().await?;
        let mut inserted = Vec::with_capacity(tags.len());
        for new_tag in tags {
            let tag = new_tag.into_tag(TagId::new(), now);
            inserted.push(TagRepository::insert(&mut tx, &tag).await?);
        }
        tx.commit()
            .await
            .map_err(db_error("Failed to commit tag import"))?;
        Ok(inserted)
    }

    async fn commit_registration(
        &self,
        plan: RegistrationPlan,
    ) -> Result<CommittedRegistration, AppError> {
        let now = Utc::now();
        let id = RegistrantId::new();
        let mut registrant = plan.registrant.into_registrant(id, now);
        let mut tx = self.begin().await?;

        let room = match plan.room_id {
            Some(room_id) => {
                let claimed = RoomRepository::claim_bed(&mut tx, room_id)
                    .await?
                    .ok_or_else(|| {
                        AppError::conflict(format!("Room {room_id} has no free bed"))
                    })?;
                let label = bed_label(&state_before_claim(&claimed), &plan.vip_label_prefix);
                registrant.record_room(&claimed.wing, &claimed.room_number, label, now);
                Some(claimed)
            }
            None => None,
        };

        let tag = match plan.tag_id {
            Some(tag_id) => {
                let claimed = TagRepository::claim(&mut tx, tag_id, id)
                    .await?
                    .ok_or_else(|| AppError::conflict(format!("Tag {tag_id} is already assigned")))?;
                registrant.record_tag(&claimed.tag_number, now);
                Some(claimed)
            }
            None => None,
        };

        let registrant = RegistrantRepository::insert(&mut tx, &registrant).await?;
        tx.commit()
            .await
            .map_err(db_error("Failed to commit registration"))?;

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
        let mut tx = self.begin().await?;

        let Some(current) = RegistrantRepository::lock(&mut tx, registrant_id).await? else {
            return Ok(PairingOutcome::RegistrantSettled);
        };
        if !current.is_room_pending() {
            return Ok(PairingOutcome::RegistrantSettled);
        }

        let Some(claimed) = RoomRepository::claim_bed(&mut tx, room_id).await? else {
            debug!(%room_id, "Room filled before pairing");
            return Ok(PairingOutcome::ResourceTaken);
        };

        let label = bed_label(&state_before_claim(&claimed), vip_label_prefix);
        let updated = RegistrantRepository::set_room(
            &mut tx,
            registrant_id,
            &claimed.wing,
            &claimed.room_number,
            &label,
        )
        .await?;
        tx.commit()
            .await
            .map_err(db_error("Failed to commit room assignment"))?;

        Ok(PairingOutcome::Assigned(updated))
    }

    async fn assign_tag(
        &self,
        registrant_id: RegistrantId,
        tag_id: TagId,
    ) -> Result<PairingOutcome, AppError> {
        let mut tx = self.begin().await?;

        let Some(current) = RegistrantRepository::lock(&mut tx, registrant_id).await? else {
            return Ok(PairingOutcome::RegistrantSettled);
        };
        if !current.is_tag_pending() {
            return Ok(PairingOutcome::RegistrantSettled);
        }

        let Some(claimed) = TagRepository::claim(&mut tx, tag_id, registrant_id).await? else {
            debug!(%tag_id, "Tag taken before pairing");
            return Ok(PairingOutcome::ResourceTaken);
        };

        let updated =
            RegistrantRepository::set_tag(&mut tx, registrant_id, &claimed.tag_number).await?;
        tx.commit()
            .await
            .map_err(db_error("Failed to commit tag assignment"))?;

        Ok(PairingOutcome::Assigned(updated))
    }

    async fn update_identity(
        &self,
        id: RegistrantId,
        update: &IdentityUpdate,
    ) -> Result<Option<Registrant>, AppError> {
        let mut tx = self.begin().await?;
        let Some(mut registrant) = RegistrantRepository::lock(&mut tx, id).await? else {
            return Ok(None);
        };
        update.apply(&mut registrant, Utc::now());
        let updated = RegistrantRepository::update_identity(&mut tx, &registrant).await?;
        tx.commit()
            .await
            .map_err(db_error("Failed to commit identity update"))?;
        Ok(Some(updated))
    }

    async fn release_registrant(
        &self,
        id: RegistrantId,
    ) -> Result<Option<ReleaseReport>, AppError> {
        let mut tx = self.begin().await?;
        let Some(registrant) = RegistrantRepository::lock(&mut tx, id).await? else {
            return Ok(None);
        };

        let room_gender = match registrant.room_number.as_deref() {
            Some(room_number) => {
                let returned = RoomRepository::return_bed(&mut tx, room_number).await?;
                if returned.is_none() {
                    warn!(
                        registrant_id = %id,
                        room_number,
                        "Room missing or already empty on release"
                    );
                }
                returned.map(|room| room.gender)
            }
            None => None,
        };

        let tag_released = match registrant.tag_number.as_deref() {
            Some(tag_number) => {
                let returned = TagRepository::release(&mut tx, tag_number).await?;
                if returned.is_none() {
                    warn!(
                        registrant_id = %id,
                        tag_number,
                        "Tag missing or not assigned on release"
                    );
                }
                returned.is_some()
            }
            None => false,
        };

        RegistrantRepository::delete(&mut tx, id).await?;
        tx.commit()
            .await
            .map_err(db_error("Failed to commit release"))?;

        Ok(Some(ReleaseReport {
            registrant,
            room_released: room_gender.is_some(),
            room_gender,
            tag_released,
        }))
    }

    async fn health_check(&self) -> Result<bool, AppError> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|v| v == 1)
            .map_err(db_error("Health check failed"))
    }
}
