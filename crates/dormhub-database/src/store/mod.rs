//! Inventory store trait and shared types.

pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use dormhub_core::config::{DatabaseConfig, StoreBackend};
use dormhub_core::error::AppError;
use dormhub_core::types::{Gender, RegistrantId, RoomId, TagId};
use dormhub_entity::registrant::{IdentityUpdate, NewRegistrant, Registrant};
use dormhub_entity::room::{NewRoom, Room};
use dormhub_entity::tag::{NewTag, Tag};

use crate::connection::DatabasePool;
use crate::migration::run_migrations;

use self::memory::MemoryInventoryStore;
use self::postgres::PgInventoryStore;

/// What a registration transaction should consume.
///
/// The room and tag are candidates chosen from an earlier read; the store
/// re-validates both when it commits.
#[derive(Debug, Clone)]
pub struct RegistrationPlan {
    /// Identity of the registrant to create.
    pub registrant: NewRegistrant,
    /// Room to take a bed from, or `None` to leave the room pending.
    pub room_id: Option<RoomId>,
    /// Tag to take, or `None` to leave the tag pending.
    pub tag_id: Option<TagId>,
    /// Prefix for synthesized bed labels in VIP rooms.
    pub vip_label_prefix: String,
}

/// Result of a committed registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommittedRegistration {
    /// The created registrant.
    pub registrant: Registrant,
    /// The room after the decrement, when a bed was taken.
    pub room: Option<Room>,
    /// The tag after assignment, when one was taken.
    pub tag: Option<Tag>,
}

/// Result of pairing one pending registrant with one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PairingOutcome {
    /// The resource was assigned; carries the updated registrant.
    Assigned(Registrant),
    /// The resource was consumed by another writer first.
    ResourceTaken,
    /// The registrant is gone or no longer pending for this resource.
    RegistrantSettled,
}

/// Result of deleting a registrant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseReport {
    /// The deleted registrant as it was before deletion.
    pub registrant: Registrant,
    /// A bed was returned to its room.
    pub room_released: bool,
    /// Gender of the room the bed went back to.
    pub room_gender: Option<Gender>,
    /// A tag was returned to the pool.
    pub tag_released: bool,
}

/// Transactional store for rooms, tags, and registrants.
///
/// Read methods return snapshots that may be stale by the time the caller
/// acts on them. Mutating methods are each one atomic transaction: they
/// re-validate every resource they consume and either apply all writes or
/// none. A resource lost to a concurrent writer during
/// [`commit_registration`](Self::commit_registration) is reported as an
/// [`ErrorKind::Conflict`](dormhub_core::error::ErrorKind::Conflict) error.
#[async_trait]
pub trait InventoryStore: Send + Sync + std::fmt::Debug {
    /// Find a room by id.
    async fn find_room(&self, id: RoomId) -> Result<Option<Room>, AppError>;

    /// Find a tag by id.
    async fn find_tag(&self, id: TagId) -> Result<Option<Tag>, AppError>;

    /// Find a registrant by id.
    async fn find_registrant(&self, id: RegistrantId) -> Result<Option<Registrant>, AppError>;

    /// All rooms, ordered by room number.
    async fn list_rooms(&self) -> Result<Vec<Room>, AppError>;

    /// All tags, ordered by tag number.
    async fn list_tags(&self) -> Result<Vec<Tag>, AppError>;

    /// All registrants, oldest first.
    async fn list_registrants(&self) -> Result<Vec<Registrant>, AppError>;

    /// Rooms of the given genders with a free bed, in room-completion
    /// priority order.
    async fn available_rooms(&self, genders: &[Gender]) -> Result<Vec<Room>, AppError>;

    /// Unassigned tags, lowest tag number first.
    async fn unassigned_tags(&self) -> Result<Vec<Tag>, AppError>;

    /// Registrants of `gender` waiting for a room, oldest first.
    async fn pending_for_room(&self, gender: Gender) -> Result<Vec<Registrant>, AppError>;

    /// Registrants waiting for a tag, oldest first.
    async fn pending_for_tag(&self) -> Result<Vec<Registrant>, AppError>;

    /// Insert imported rooms with every bed free. All or nothing; a room
    /// number that already exists rejects the batch.
    async fn insert_rooms(&self, rooms: Vec<NewRoom>) -> Result<Vec<Room>, AppError>;

    /// Insert imported tags unassigned. All or nothing.
    async fn insert_tags(&self, tags: Vec<NewTag>) -> Result<Vec<Tag>, AppError>;

    /// Create a registrant and consume the planned bed and tag atomically.
    async fn commit_registration(
        &self,
        plan: RegistrationPlan,
    ) -> Result<CommittedRegistration, AppError>;

    /// Give a room-pending registrant the next bed of `room_id`.
    async fn assign_room(
        &self,
        registrant_id: RegistrantId,
        room_id: RoomId,
        vip_label_prefix: &str,
    ) -> Result<PairingOutcome, AppError>;

    /// Give a tag-pending registrant the tag `tag_id`.
    async fn assign_tag(
        &self,
        registrant_id: RegistrantId,
        tag_id: TagId,
    ) -> Result<PairingOutcome, AppError>;

    /// Apply an identity edit. Returns `None` when the registrant is gone.
    async fn update_identity(
        &self,
        id: RegistrantId,
        update: &IdentityUpdate,
    ) -> Result<Option<Registrant>, AppError>;

    /// Return the registrant's bed and tag to the pool and delete it.
    /// Returns `None` when the registrant does not exist.
    async fn release_registrant(&self, id: RegistrantId)
    -> Result<Option<ReleaseReport>, AppError>;

    /// Check that the store backend is reachable.
    async fn health_check(&self) -> Result<bool, AppError>;
}

/// Open the store selected by configuration.
pub async fn open(config: &DatabaseConfig) -> Result<Arc<dyn InventoryStore>, AppError> {
    match config.backend {
        StoreBackend::Memory => {
            info!("Using in-memory inventory store");
            Ok(Arc::new(MemoryInventoryStore::new()))
        }
        StoreBackend::Postgres => {
            let pool = DatabasePool::connect(config).await?;
            if config.run_migrations {
                run_migrations(pool.pool()).await?;
            }
            Ok(Arc::new(PgInventoryStore::new(pool.into_pool())))
        }
    }
}
