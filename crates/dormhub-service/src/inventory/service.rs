//! Inventory service: bulk import and listings of rooms and tags.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use tracing::info;

use dormhub_core::error::AppError;
use dormhub_core::events::{EventBus, InventoryEvent};
use dormhub_database::store::InventoryStore;
use dormhub_entity::room::{NewRoom, Room};
use dormhub_entity::tag::{NewTag, Tag};

/// Imports inventory and announces it so pending registrants get picked up.
#[derive(Debug, Clone)]
pub struct InventoryService {
    store: Arc<dyn InventoryStore>,
    events: EventBus,
}

impl InventoryService {
    /// Create an inventory service.
    pub fn new(store: Arc<dyn InventoryStore>, events: EventBus) -> Self {
        Self { store, events }
    }

    /// Import rooms with every bed free. The batch is rejected as a whole on
    /// any invalid row or duplicate room number.
    pub async fn import_rooms(&self, rooms: Vec<NewRoom>) -> Result<Vec<Room>, AppError> {
        if rooms.is_empty() {
            return Err(AppError::validation("Room import is empty"));
        }
        let mut seen = HashSet::new();
        for room in &rooms {
            room.check()?;
            if !seen.insert(room.room_number.trim()) {
                return Err(AppError::validation(format!(
                    "Room number '{}' appears twice in the import",
                    room.room_number.trim()
                )));
            }
        }

        let inserted = self.store.insert_rooms(rooms).await?;
        let genders: BTreeSet<_> = inserted.iter().map(|r| r.gender).collect();
        let beds: i32 = inserted.iter().map(|r| r.total_beds).sum();
        info!(rooms = inserted.len(), beds, "Rooms imported");

        self.events.publish(InventoryEvent::RoomsAdded {
            genders: genders.into_iter().collect(),
            count: inserted.len(),
        });
        Ok(inserted)
    }

    /// Import tags unassigned. The batch is rejected as a whole on any
    /// invalid row or duplicate tag number.
    pub async fn import_tags(&self, tags: Vec<NewTag>) -> Result<Vec<Tag>, AppError> {
        if tags.is_empty() {
            return Err(AppError::validation("Tag import is empty"));
        }
        let mut seen = HashSet::new();
        for tag in &tags {
            tag.check()?;
            if !seen.insert(tag.tag_number.trim()) {
                return Err(AppError::validation(format!(
                    "Tag number '{}' appears twice in the import",
                    tag.tag_number.trim()
                )));
            }
        }

        let inserted = self.store.insert_tags(tags).await?;
        info!(tags = inserted.len(), "Tags imported");

        self.events.publish(InventoryEvent::TagsAdded {
            count: inserted.len(),
        });
        Ok(inserted)
    }

    /// All rooms ordered by room number.
    pub async fn list_rooms(&self) -> Result<Vec<Room>, AppError> {
        self.store.list_rooms().await
    }

    /// All tags ordered by tag number.
    pub async fn list_tags(&self) -> Result<Vec<Tag>, AppError> {
        self.store.list_tags().await
    }
}

#[cfg(test)]
mod tests {
    use dormhub_core::error::ErrorKind;
    use dormhub_core::types::Gender;
    use dormhub_database::MemoryInventoryStore;

    use super::*;

    fn room(number: &str, gender: Gender) -> NewRoom {
        NewRoom {
            wing: "North".to_string(),
            room_number: number.to_string(),
            gender,
            total_beds: 3,
            bed_numbers: None,
            is_vip_room: false,
        }
    }

    #[tokio::test]
    async fn test_import_rooms_announces_genders() {
        let events = EventBus::default();
        let mut rx = events.subscribe();
        let svc = InventoryService::new(Arc::new(MemoryInventoryStore::new()), events);

        let rooms = svc
            .import_rooms(vec![
                room("A", Gender::Female),
                room("B", Gender::Male),
                room("C", Gender::Female),
            ])
            .await
            .expect("import");
        assert!(rooms.iter().all(|r| r.available_beds == r.total_beds));

        let event = rx.recv().await.expect("event");
        assert_eq!(
            event.payload,
            InventoryEvent::RoomsAdded {
                genders: vec![Gender::Male, Gender::Female],
                count: 3,
            }
        );
    }

    #[tokio::test]
    async fn test_duplicate_in_batch_rejected_before_store() {
        let store = MemoryInventoryStore::new();
        let svc = InventoryService::new(Arc::new(store.clone()), EventBus::default());

        let err = svc
            .import_rooms(vec![room("A", Gender::Male), room(" A ", Gender::Male)])
            .await
            .expect_err("duplicate");
        assert_eq!(err.kind, ErrorKind::Validation);
        assert!(svc.list_rooms().await.expect("rooms").is_empty());
    }

    #[tokio::test]
    async fn test_import_tags_unassigned_and_ordered() {
        let svc = InventoryService::new(Arc::new(MemoryInventoryStore::new()), EventBus::default());
        svc.import_tags(
            ["10", "2", "3"]
                .into_iter()
                .map(|n| NewTag {
                    tag_number: n.to_string(),
                })
                .collect(),
        )
        .await
        .expect("import");

        let tags = svc.list_tags().await.expect("tags");
        let numbers: Vec<_> = tags.iter().map(|t| t.tag_number.as_str()).collect();
        assert_eq!(numbers, vec!["2", "3", "10"]);
        assert!(tags.iter().all(|t| !t.is_assigned));
    }

    #[tokio::test]
    async fn test_empty_import_rejected() {
        let svc = InventoryService::new(Arc::new(MemoryInventoryStore::new()), EventBus::default());
        assert!(svc.import_tags(Vec::new()).await.is_err());
    }
}
