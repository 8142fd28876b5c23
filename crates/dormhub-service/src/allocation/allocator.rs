//! Single-attempt allocation of a room-bed and a tag to a new registrant.
//!
//! Candidates are read outside the transaction and are only hints; the
//! store's `commit_registration` re-validates them and fails the whole
//! attempt with a conflict if another registration got there first.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use dormhub_core::config::AllocationConfig;
use dormhub_core::error::AppError;
use dormhub_core::types::{Gender, RoomId, TagId};
use dormhub_database::store::{CommittedRegistration, InventoryStore, RegistrationPlan};
use dormhub_entity::registrant::{Registrant, RegistrationRequest};
use dormhub_entity::room::Room;
use dormhub_entity::tag::Tag;

use super::selection::{room_pool, vet_selected_room, vet_selected_tag};

/// Outcome of a successful allocation.
#[derive(Debug, Clone, Serialize)]
pub struct Allocation {
    /// The created registrant.
    pub registrant: Registrant,
    /// The room a bed was taken from, after the decrement.
    pub room: Option<Room>,
    /// The assigned tag.
    pub tag: Option<Tag>,
    /// No bed was available; the sweeper will assign one.
    pub pending_room: bool,
    /// No tag was available; the sweeper will assign one.
    pub pending_tag: bool,
}

impl From<CommittedRegistration> for Allocation {
    fn from(committed: CommittedRegistration) -> Self {
        Self {
            pending_room: committed.room.is_none(),
            pending_tag: committed.tag.is_none(),
            registrant: committed.registrant,
            room: committed.room,
            tag: committed.tag,
        }
    }
}

/// Chooses candidates and commits one registration attempt.
#[derive(Debug, Clone)]
pub struct Allocator {
    store: Arc<dyn InventoryStore>,
    config: AllocationConfig,
}

impl Allocator {
    /// Create an allocator over `store`.
    pub fn new(store: Arc<dyn InventoryStore>, config: AllocationConfig) -> Self {
        Self { store, config }
    }

    /// Allocate once, without retry.
    ///
    /// Invalid input fails before any inventory read. Missing inventory
    /// yields a pending allocation, or [`ErrorKind::Exhausted`] when pending
    /// is disabled. A lost race yields [`ErrorKind::Conflict`].
    ///
    /// [`ErrorKind::Exhausted`]: dormhub_core::error::ErrorKind::Exhausted
    /// [`ErrorKind::Conflict`]: dormhub_core::error::ErrorKind::Conflict
    pub async fn allocate(&self, request: &RegistrationRequest) -> Result<Allocation, AppError> {
        let identity = request.check()?;
        let gender = identity.gender;

        let room_id = self.room_candidate(request, gender).await?;
        let tag_id = self.tag_candidate(request).await?;

        if !self.config.allow_pending {
            if room_id.is_none() {
                return Err(AppError::exhausted(format!(
                    "No {gender} room has a free bed"
                )));
            }
            if tag_id.is_none() {
                return Err(AppError::exhausted("No unassigned tag is left"));
            }
        }

        let committed = self
            .store
            .commit_registration(RegistrationPlan {
                registrant: identity,
                room_id,
                tag_id,
                vip_label_prefix: self.config.vip_label_prefix.clone(),
            })
            .await?;

        let allocation = Allocation::from(committed);
        info!(
            registrant_id = %allocation.registrant.id,
            %gender,
            room_number = allocation.registrant.room_number.as_deref().unwrap_or("-"),
            bed_number = allocation.registrant.bed_number.as_deref().unwrap_or("-"),
            tag_number = allocation.registrant.tag_number.as_deref().unwrap_or("-"),
            pending_room = allocation.pending_room,
            pending_tag = allocation.pending_tag,
            "Registrant allocated"
        );
        Ok(allocation)
    }

    async fn room_candidate(
        &self,
        request: &RegistrationRequest,
        gender: Gender,
    ) -> Result<Option<RoomId>, AppError> {
        if let Some(id) = request.selected_room_id {
            let room = self.store.find_room(id).await?;
            match vet_selected_room(id, room, gender, request.allow_cross_gender)? {
                Some(room) => return Ok(Some(room.id)),
                None => debug!(room_id = %id, "Selected room is full, choosing automatically"),
            }
        }

        let pool = room_pool(gender, request.allow_cross_gender);
        let rooms = self.store.available_rooms(&pool).await?;
        Ok(rooms.first().map(|room| room.id))
    }

    async fn tag_candidate(&self, request: &RegistrationRequest) -> Result<Option<TagId>, AppError> {
        if let Some(id) = request.selected_tag_id {
            let tag = self.store.find_tag(id).await?;
            match vet_selected_tag(id, tag)? {
                Some(tag) => return Ok(Some(tag.id)),
                None => debug!(tag_id = %id, "Selected tag is taken, choosing automatically"),
            }
        }

        let tags = self.store.unassigned_tags().await?;
        Ok(tags.first().map(|tag| tag.id))
    }
}
