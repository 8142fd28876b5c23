//! Availability snapshots and live feeds.
//!
//! Snapshots apply the same filters as the allocator: rooms of one gender
//! with a free bed in room-completion order, and unassigned tags in numeric
//! order. Live feeds re-read a snapshot after every inventory event that
//! may have changed either half.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use dormhub_core::error::AppError;
use dormhub_core::events::{DomainEvent, EventBus};
use dormhub_core::types::Gender;
use dormhub_database::store::InventoryStore;
use dormhub_entity::room::Room;
use dormhub_entity::tag::Tag;

/// Rooms and tags a registrant of one gender may pick from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AvailabilitySnapshot {
    /// Gender the room list is filtered for.
    pub gender: Gender,
    /// Rooms with a free bed, highest priority first.
    pub rooms: Vec<Room>,
    /// Unassigned tags, lowest number first.
    pub tags: Vec<Tag>,
}

/// A fresh snapshot and which halves prompted it.
#[derive(Debug, Clone, Serialize)]
pub struct AvailabilityUpdate {
    /// Current availability.
    pub snapshot: AvailabilitySnapshot,
    /// Room availability may have changed.
    pub rooms_changed: bool,
    /// Tag availability may have changed.
    pub tags_changed: bool,
}

/// Read-only availability queries.
#[derive(Debug, Clone)]
pub struct AvailabilityService {
    store: Arc<dyn InventoryStore>,
    events: EventBus,
}

impl AvailabilityService {
    /// Create an availability service.
    pub fn new(store: Arc<dyn InventoryStore>, events: EventBus) -> Self {
        Self { store, events }
    }

    /// Current availability for `gender`.
    pub async fn snapshot(&self, gender: Gender) -> Result<AvailabilitySnapshot, AppError> {
        read_snapshot(self.store.as_ref(), gender).await
    }

    /// Follow availability for `gender`. Only events after this call are
    /// observed; take a [`snapshot`](Self::snapshot) for the initial state.
    pub fn watch(&self, gender: Gender) -> AvailabilityWatch {
        AvailabilityWatch {
            store: self.store.clone(),
            gender,
            rx: self.events.subscribe(),
        }
    }

    /// Deliver availability to callbacks until the subscription is dropped.
    ///
    /// Both callbacks receive the initial state; afterwards each is called
    /// only when its half may have changed.
    pub fn subscribe<R, T>(&self, gender: Gender, on_rooms: R, on_tags: T) -> Subscription
    where
        R: Fn(Vec<Room>) + Send + Sync + 'static,
        T: Fn(Vec<Tag>) + Send + Sync + 'static,
    {
        let mut watch = self.watch(gender);
        let store = self.store.clone();

        let handle = tokio::spawn(async move {
            match read_snapshot(store.as_ref(), gender).await {
                Ok(initial) => {
                    on_rooms(initial.rooms);
                    on_tags(initial.tags);
                }
                Err(e) => warn!(%gender, error = %e, "Initial availability snapshot failed"),
            }

            while let Some(update) = watch.changed().await {
                match update {
                    Ok(update) => {
                        if update.rooms_changed {
                            on_rooms(update.snapshot.rooms);
                        }
                        if update.tags_changed {
                            on_tags(update.snapshot.tags);
                        }
                    }
                    Err(e) => warn!(%gender, error = %e, "Availability refresh failed"),
                }
            }
            debug!(%gender, "Availability subscription ended");
        });

        Subscription { handle }
    }
}

async fn read_snapshot(
    store: &dyn InventoryStore,
    gender: Gender,
) -> Result<AvailabilitySnapshot, AppError> {
    Ok(AvailabilitySnapshot {
        gender,
        rooms: store.available_rooms(&[gender]).await?,
        tags: store.unassigned_tags().await?,
    })
}

/// Stream of availability changes for one gender.
#[derive(Debug)]
pub struct AvailabilityWatch {
    store: Arc<dyn InventoryStore>,
    gender: Gender,
    rx: broadcast::Receiver<DomainEvent>,
}

impl AvailabilityWatch {
    /// Gender this watch follows.
    pub fn gender(&self) -> Gender {
        self.gender
    }

    /// Wait for the next relevant change and return a fresh snapshot.
    ///
    /// Events already queued behind the first are folded into the same
    /// update. A lagged receiver resynchronizes with a full update. Returns
    /// `None` once the event bus is gone.
    pub async fn changed(&mut self) -> Option<Result<AvailabilityUpdate, AppError>> {
        let (mut rooms_changed, mut tags_changed) = loop {
            match self.rx.recv().await {
                Ok(event) => {
                    let flags = self.relevance(&event);
                    if flags.0 || flags.1 {
                        break flags;
                    }
                }
                Err(RecvError::Lagged(missed)) => {
                    debug!(gender = %self.gender, missed, "Availability watch lagged, resyncing");
                    break (true, true);
                }
                Err(RecvError::Closed) => return None,
            }
        };

        loop {
            match self.rx.try_recv() {
                Ok(event) => {
                    let (rooms, tags) = self.relevance(&event);
                    rooms_changed |= rooms;
                    tags_changed |= tags;
                }
                Err(TryRecvError::Lagged(_)) => {
                    rooms_changed = true;
                    tags_changed = true;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }

        Some(
            read_snapshot(self.store.as_ref(), self.gender)
                .await
                .map(|snapshot| AvailabilityUpdate {
                    snapshot,
                    rooms_changed,
                    tags_changed,
                }),
        )
    }

    fn relevance(&self, event: &DomainEvent) -> (bool, bool) {
        (
            event.payload.affects_rooms(self.gender),
            event.payload.affects_tags(),
        )
    }
}

/// Handle to a running availability subscription. Dropping it stops
/// delivery.
#[derive(Debug)]
pub struct Subscription {
    handle: JoinHandle<()>,
}

impl Subscription {
    /// Stop delivery.
    pub fn unsubscribe(self) {
        self.handle.abort();
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use chrono::NaiveDate;

    use dormhub_core::config::AllocationConfig;
    use dormhub_core::events::InventoryEvent;
    use dormhub_database::MemoryInventoryStore;
    use dormhub_entity::registrant::RegistrationRequest;
    use dormhub_entity::room::NewRoom;
    use dormhub_entity::tag::NewTag;

    use crate::registration::RegistrationService;

    use super::*;

    fn room(number: &str, gender: Gender) -> NewRoom {
        NewRoom {
            wing: "North".to_string(),
            room_number: number.to_string(),
            gender,
            total_beds: 2,
            bed_numbers: None,
            is_vip_room: false,
        }
    }

    #[tokio::test]
    async fn test_snapshot_filters_by_gender() {
        let store = MemoryInventoryStore::new();
        store
            .insert_rooms(vec![room("F1", Gender::Female), room("M1", Gender::Male)])
            .await
            .expect("rooms");
        let svc = AvailabilityService::new(Arc::new(store), EventBus::default());

        let snapshot = svc.snapshot(Gender::Female).await.expect("snapshot");
        assert_eq!(snapshot.rooms.len(), 1);
        assert_eq!(snapshot.rooms[0].room_number, "F1");
    }

    #[tokio::test]
    async fn test_watch_skips_irrelevant_events() {
        let store = MemoryInventoryStore::new();
        let events = EventBus::default();
        let svc = AvailabilityService::new(Arc::new(store.clone()), events.clone());
        let mut watch = svc.watch(Gender::Female);

        events.publish(InventoryEvent::RoomsAdded {
            genders: vec![Gender::Male],
            count: 1,
        });
        store
            .insert_tags(vec![NewTag {
                tag_number: "4".to_string(),
            }])
            .await
            .expect("tags");
        events.publish(InventoryEvent::TagsAdded { count: 1 });

        let update = watch.changed().await.expect("open").expect("snapshot");
        assert!(!update.rooms_changed);
        assert!(update.tags_changed);
        assert_eq!(update.snapshot.tags.len(), 1);
    }

    #[tokio::test]
    async fn test_cross_gender_placement_refreshes_room_gender_feed() {
        let store = MemoryInventoryStore::new();
        let events = EventBus::default();
        store
            .insert_rooms(vec![room("F1", Gender::Female)])
            .await
            .expect("rooms");
        let svc = AvailabilityService::new(Arc::new(store.clone()), events.clone());
        let registration = RegistrationService::new(
            Arc::new(store.clone()),
            events.clone(),
            &AllocationConfig::default(),
        );
        let mut female = svc.watch(Gender::Female);

        let allocation = registration
            .register(&RegistrationRequest {
                full_name: "Tunde Bello".to_string(),
                date_of_birth: NaiveDate::from_ymd_opt(1999, 3, 4),
                gender: Some(Gender::Male),
                phone: "0805".to_string(),
                allow_cross_gender: true,
                ..Default::default()
            })
            .await
            .expect("register");
        assert_eq!(allocation.registrant.room_number.as_deref(), Some("F1"));

        let update = tokio::time::timeout(Duration::from_secs(1), female.changed())
            .await
            .expect("female feed refreshed on claim")
            .expect("open")
            .expect("snapshot");
        assert!(update.rooms_changed);
        assert_eq!(update.snapshot.rooms[0].available_beds, 1);

        registration
            .release(allocation.registrant.id)
            .await
            .expect("release");
        let update = tokio::time::timeout(Duration::from_secs(1), female.changed())
            .await
            .expect("female feed refreshed on release")
            .expect("open")
            .expect("snapshot");
        assert!(update.rooms_changed);
        assert_eq!(update.snapshot.rooms[0].available_beds, 2);
    }

    #[tokio::test]
    async fn test_watch_ends_with_bus() {
        let events = EventBus::default();
        let svc = AvailabilityService::new(Arc::new(MemoryInventoryStore::new()), events.clone());
        let mut watch = svc.watch(Gender::Male);
        drop(svc);
        drop(events);
        assert!(watch.changed().await.is_none());
    }

    #[tokio::test]
    async fn test_subscription_delivers_changed_half() {
        let store = MemoryInventoryStore::new();
        let events = EventBus::default();
        let svc = AvailabilityService::new(Arc::new(store.clone()), events.clone());

        let room_calls = Arc::new(Mutex::new(Vec::new()));
        let tag_calls = Arc::new(Mutex::new(0usize));
        let rooms_sink = room_calls.clone();
        let tags_sink = tag_calls.clone();
        let subscription = svc.subscribe(
            Gender::Male,
            move |rooms| rooms_sink.lock().expect("lock").push(rooms.len()),
            move |_| *tags_sink.lock().expect("lock") += 1,
        );

        tokio::time::sleep(Duration::from_millis(20)).await;
        store
            .insert_rooms(vec![room("M1", Gender::Male)])
            .await
            .expect("rooms");
        events.publish(InventoryEvent::RoomsAdded {
            genders: vec![Gender::Male],
            count: 1,
        });
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(*room_calls.lock().expect("lock"), vec![0, 1]);
        assert_eq!(*tag_calls.lock().expect("lock"), 1);

        subscription.unsubscribe();
    }
}
