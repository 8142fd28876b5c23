//! Response DTOs.

use serde::{Deserialize, Serialize};

use dormhub_core::types::{RegistrantId, RoomId, TagId};
use dormhub_entity::registrant::Registrant;
use dormhub_service::Allocation;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Bed handed out at registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomAssignment {
    /// Room ID.
    pub room_id: RoomId,
    /// Wing.
    pub wing: String,
    /// Room number.
    pub room_number: String,
    /// Bed label.
    pub bed_number: String,
}

/// Tag handed out at registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagAssignment {
    /// Tag ID.
    pub tag_id: TagId,
    /// Tag number.
    pub tag_number: String,
}

/// Result of a registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationResponse {
    /// The created registrant.
    pub registrant: Registrant,
    /// Bed assignment, unless pending.
    pub room_assignment: Option<RoomAssignment>,
    /// Tag assignment, unless pending.
    pub tag_assignment: Option<TagAssignment>,
    /// The room will be assigned later.
    pub pending_room: bool,
    /// The tag will be assigned later.
    pub pending_tag: bool,
    /// Informational note for pending assignments.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<Allocation> for RegistrationResponse {
    fn from(allocation: Allocation) -> Self {
        let room_assignment = allocation.room.as_ref().map(|room| RoomAssignment {
            room_id: room.id,
            wing: room.wing.clone(),
            room_number: room.room_number.clone(),
            bed_number: allocation.registrant.bed_number.clone().unwrap_or_default(),
        });
        let tag_assignment = allocation.tag.as_ref().map(|tag| TagAssignment {
            tag_id: tag.id,
            tag_number: tag.tag_number.clone(),
        });
        let message = match (allocation.pending_room, allocation.pending_tag) {
            (false, false) => None,
            (true, false) => Some("Room will be assigned later".to_string()),
            (false, true) => Some("Tag will be assigned later".to_string()),
            (true, true) => Some("Room and tag will be assigned later".to_string()),
        };

        Self {
            registrant: allocation.registrant,
            room_assignment,
            tag_assignment,
            pending_room: allocation.pending_room,
            pending_tag: allocation.pending_tag,
            message,
        }
    }
}

/// Result of deleting a registrant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseResponse {
    /// The deleted registrant.
    pub registrant_id: RegistrantId,
    /// A bed was returned.
    pub room_released: bool,
    /// A tag was returned.
    pub tag_released: bool,
}

/// Result of a bulk import.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportResponse<T> {
    /// Rows created.
    pub imported: usize,
    /// The created rows.
    pub items: Vec<T>,
}

/// Result of a manual sweep request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepRequestResponse {
    /// A new pass was queued, rather than folded into one already waiting.
    pub queued: bool,
}

/// Liveness.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status.
    pub status: String,
    /// Crate version.
    pub version: String,
    /// Store reachability.
    pub store: String,
    /// Seconds since start.
    pub uptime_seconds: u64,
}
