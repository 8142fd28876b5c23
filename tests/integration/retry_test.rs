//! Retry behaviour against a store that loses commit races on demand.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use dormhub_core::config::AllocationConfig;
use dormhub_core::error::{AppError, ErrorKind};
use dormhub_core::events::EventBus;
use dormhub_core::types::{Gender, RegistrantId, RoomId, TagId};
use dormhub_database::MemoryInventoryStore;
use dormhub_database::store::{
    CommittedRegistration, InventoryStore, PairingOutcome, RegistrationPlan, ReleaseReport,
};
use dormhub_entity::registrant::{IdentityUpdate, Registrant};
use dormhub_entity::room::{NewRoom, Room};
use dormhub_entity::tag::{NewTag, Tag};
use dormhub_service::RegistrationService;

use crate::helpers::{registration, room};

/// Fails the next `losses` commits with a contention error.
#[derive(Debug)]
struct RacingStore {
    inner: MemoryInventoryStore,
    losses: AtomicU32,
    commits: AtomicU32,
}

impl RacingStore {
    fn new(losses: u32) -> Self {
        Self {
            inner: MemoryInventoryStore::new(),
            losses: AtomicU32::new(losses),
            commits: AtomicU32::new(0),
        }
    }
}

#[async_trait]
impl InventoryStore for RacingStore {
    async fn find_room(&self, id: RoomId) -> Result<Option<Room>, AppError> {
        self.inner.find_room(id).await
    }

    async fn find_tag(&self, id: TagId) -> Result<Option<Tag>, AppError> {
        self.inner.find_tag(id).await
    }

    async fn find_registrant(&self, id: RegistrantId) -> Result<Option<Registrant>, AppError> {
        self.inner.find_registrant(id).await
    }

    async fn list_rooms(&self) -> Result<Vec<Room>, AppError> {
        self.inner.list_rooms().await
    }

    async fn list_tags(&self) -> Result<Vec<Tag>, AppError> {
        self.inner.list_tags().await
    }

    async fn list_registrants(&self) -> Result<Vec<Registrant>, AppError> {
        self.inner.list_registrants().await
    }

    async fn available_rooms(&self, genders: &[Gender]) -> Result<Vec<Room>, AppError> {
        self.inner.available_rooms(genders).await
    }

    async fn unassigned_tags(&self) -> Result<Vec<Tag>, AppError> {
        self.inner.unassigned_tags().await
    }

    async fn pending_for_room(&self, gender: Gender) -> Result<Vec<Registrant>, AppError> {
        self.inner.pending_for_room(gender).await
    }

    async fn pending_for_tag(&self) -> Result<Vec<Registrant>, AppError> {
        self.inner.pending_for_tag().await
    }

    async fn insert_rooms(&self, rooms: Vec<NewRoom>) -> Result<Vec<Room>, AppError> {
        self.inner.insert_rooms(rooms).await
    }

    async fn insert_tags(&self, tags: Vec<NewTag>) -> Result<Vec<Tag>, AppError> {
        self.inner.insert_tags(tags).await
    }

    async fn commit_registration(
        &self,
        plan: RegistrationPlan,
    ) -> Result<CommittedRegistration, AppError> {
        self.commits.fetch_add(1, Ordering::SeqCst);
        let lose = self
            .losses
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if lose {
            return Err(AppError::conflict("Room R1 was taken by a concurrent registration"));
        }
        self.inner.commit_registration(plan).await
    }

    async fn assign_room(
        &self,
        registrant_id: RegistrantId,
        room_id: RoomId,
        vip_label_prefix: &str,
    ) -> Result<PairingOutcome, AppError> {
        self.inner
            .assign_room(registrant_id, room_id, vip_label_prefix)
            .await
    }

    async fn assign_tag(
        &self,
        registrant_id: RegistrantId,
        tag_id: TagId,
    ) -> Result<PairingOutcome, AppError> {
        self.inner.assign_tag(registrant_id, tag_id).await
    }

    async fn update_identity(
        &self,
        id: RegistrantId,
        update: &IdentityUpdate,
    ) -> Result<Option<Registrant>, AppError> {
        self.inner.update_identity(id, update).await
    }

    async fn release_registrant(
        &self,
        id: RegistrantId,
    ) -> Result<Option<ReleaseReport>, AppError> {
        self.inner.release_registrant(id).await
    }

    async fn health_check(&self) -> Result<bool, AppError> {
        self.inner.health_check().await
    }
}

async fn service_over(store: &Arc<RacingStore>) -> RegistrationService {
    store
        .insert_rooms(vec![room("R1", Gender::Male, 2, &[])])
        .await
        .expect("rooms");
    RegistrationService::new(
        Arc::clone(store) as Arc<dyn InventoryStore>,
        EventBus::default(),
        &AllocationConfig::default(),
    )
}

#[tokio::test(start_paused = true)]
async fn test_lost_races_are_retried_with_backoff() {
    let store = Arc::new(RacingStore::new(2));
    let svc = service_over(&store).await;

    let started = tokio::time::Instant::now();
    let allocation = svc
        .register(&registration("Patient", Gender::Male))
        .await
        .expect("third attempt wins");

    assert_eq!(store.commits.load(Ordering::SeqCst), 3);
    assert_eq!(allocation.registrant.room_number.as_deref(), Some("R1"));
    assert!(started.elapsed() >= Duration::from_millis(600));
}

#[tokio::test(start_paused = true)]
async fn test_exhausted_budget_asks_caller_to_retry() {
    let store = Arc::new(RacingStore::new(u32::MAX));
    let svc = service_over(&store).await;

    let err = svc
        .register(&registration("Unlucky", Gender::Male))
        .await
        .expect_err("every attempt loses");

    assert_eq!(err.kind, ErrorKind::Conflict);
    assert!(err.message.contains("please retry registration"));
    assert_eq!(store.commits.load(Ordering::SeqCst), 3);
    assert!(store.list_registrants().await.expect("list").is_empty());
    assert_eq!(
        store.list_rooms().await.expect("rooms")[0].available_beds,
        2
    );
}

#[tokio::test]
async fn test_validation_failure_is_not_retried() {
    let store = Arc::new(RacingStore::new(0));
    let svc = service_over(&store).await;

    let mut request = registration("", Gender::Male);
    request.full_name = "   ".to_string();
    let err = svc.register(&request).await.expect_err("blank name");

    assert_eq!(err.kind, ErrorKind::Validation);
    assert_eq!(store.commits.load(Ordering::SeqCst), 0);
}
