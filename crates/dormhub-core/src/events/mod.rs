//! Inventory change events.
//!
//! Every committed mutation of rooms, tags, or registrants is announced on
//! the [`EventBus`]. The availability feed and the reconciliation trigger
//! consume these events; nothing on the transactional path waits for them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::types::{Gender, RegistrantId};

/// What changed in the inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InventoryEvent {
    /// New rooms were imported.
    RoomsAdded {
        /// Genders of the imported rooms.
        genders: Vec<Gender>,
        /// Number of rooms imported.
        count: usize,
    },
    /// New tags were imported.
    TagsAdded {
        /// Number of tags imported.
        count: usize,
    },
    /// A registrant was created, consuming whatever it was assigned.
    RegistrantCreated {
        /// The new registrant.
        registrant_id: RegistrantId,
        /// Registrant gender, which may differ from the room's.
        gender: Gender,
        /// Whether a bed was consumed.
        room_assigned: bool,
        /// Gender of the room the bed was taken from.
        room_gender: Option<Gender>,
        /// Whether a tag was consumed.
        tag_assigned: bool,
    },
    /// A pending registrant was completed by the sweeper.
    PendingResolved {
        /// The registrant.
        registrant_id: RegistrantId,
        /// Registrant gender, which may differ from the room's.
        gender: Gender,
        /// A bed was assigned.
        room_assigned: bool,
        /// Gender of the room the bed was taken from.
        room_gender: Option<Gender>,
        /// A tag was assigned.
        tag_assigned: bool,
    },
    /// A registrant was deleted and its bed/tag returned to the pool.
    ResourcesReleased {
        /// The deleted registrant.
        registrant_id: RegistrantId,
        /// Registrant gender, which may differ from the room's.
        gender: Gender,
        /// A bed was returned.
        room_released: bool,
        /// Gender of the room the bed went back to.
        room_gender: Option<Gender>,
        /// A tag was returned.
        tag_released: bool,
    },
}

impl InventoryEvent {
    /// Whether room availability of `gender` may have changed.
    ///
    /// Keyed on the gender of the room whose counter moved, which differs
    /// from the registrant's for cross-gender placements.
    pub fn affects_rooms(&self, gender: Gender) -> bool {
        match self {
            Self::RoomsAdded { genders, .. } => genders.contains(&gender),
            Self::TagsAdded { .. } => false,
            Self::RegistrantCreated { room_gender, .. }
            | Self::PendingResolved { room_gender, .. }
            | Self::ResourcesReleased { room_gender, .. } => *room_gender == Some(gender),
        }
    }

    /// Whether tag availability may have changed.
    pub fn affects_tags(&self) -> bool {
        match self {
            Self::RoomsAdded { .. } => false,
            Self::TagsAdded { .. } => true,
            Self::RegistrantCreated { tag_assigned, .. }
            | Self::PendingResolved { tag_assigned, .. } => *tag_assigned,
            Self::ResourcesReleased { tag_released, .. } => *tag_released,
        }
    }

    /// Whether this event may let a pending registrant be completed.
    ///
    /// New inventory and freed resources qualify, as does a registrant that
    /// was just recorded as pending (inventory may have appeared between its
    /// candidate read and its commit).
    pub fn may_unblock_pending(&self) -> bool {
        match self {
            Self::RoomsAdded { .. } | Self::TagsAdded { .. } => true,
            Self::ResourcesReleased {
                room_released,
                tag_released,
                ..
            } => *room_released || *tag_released,
            Self::RegistrantCreated {
                room_assigned,
                tag_assigned,
                ..
            } => !room_assigned || !tag_assigned,
            Self::PendingResolved { .. } => false,
        }
    }
}

/// An [`InventoryEvent`] with metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent {
    /// Unique event ID.
    pub id: Uuid,
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// The event payload.
    pub payload: InventoryEvent,
}

impl DomainEvent {
    /// Create a new domain event.
    pub fn new(payload: InventoryEvent) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            payload,
        }
    }
}

/// In-process broadcast bus for inventory events.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<DomainEvent>,
}

impl EventBus {
    /// Create a bus whose subscribers buffer up to `capacity` events.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publish an event. Having no subscribers is not an error.
    pub fn publish(&self, payload: InventoryEvent) {
        let event = DomainEvent::new(payload);
        tracing::debug!(event_id = %event.id, payload = ?event.payload, "Publishing inventory event");
        let _ = self.tx.send(event);
    }

    /// Subscribe to all events published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.tx.subscribe()
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
