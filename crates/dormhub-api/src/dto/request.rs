//! Request DTOs.

use serde::{Deserialize, Serialize};

use dormhub_core::types::Gender;
use dormhub_entity::room::NewRoom;
use dormhub_entity::tag::NewTag;

/// Body of `POST /api/rooms/import`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportRoomsRequest {
    /// Rooms to create.
    pub rooms: Vec<NewRoom>,
}

/// Body of `POST /api/tags/import`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportTagsRequest {
    /// Tags to create.
    pub tags: Vec<NewTag>,
}

/// Query of the availability endpoints.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AvailabilityQuery {
    /// Gender whose rooms to list.
    pub gender: Gender,
}
