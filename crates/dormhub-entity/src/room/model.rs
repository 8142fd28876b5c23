//! Room entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use dormhub_core::AppError;
use dormhub_core::types::{Gender, RoomId};

/// A gender-segregated room with a fixed number of beds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Room {
    /// Unique room identifier.
    pub id: RoomId,
    /// Wing label.
    pub wing: String,
    /// Room number, unique across all rooms.
    pub room_number: String,
    /// Which registrants may occupy this room.
    pub gender: Gender,
    /// Bed count; fixed at import.
    pub total_beds: i32,
    /// Free beds, `0..=total_beds`.
    pub available_beds: i32,
    /// Bed labels, one per bed, if the import supplied them.
    pub bed_numbers: Option<Vec<String>>,
    /// Reserved-pool marker.
    pub is_vip_room: bool,
    /// When a bed in this room was last handed out.
    pub last_assigned: Option<DateTime<Utc>>,
    /// When the room was imported.
    pub created_at: DateTime<Utc>,
    /// When the room was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Room {
    /// Beds currently taken.
    pub fn occupancy(&self) -> i32 {
        self.total_beds - self.available_beds
    }

    /// Whether at least one bed is free.
    pub fn has_vacancy(&self) -> bool {
        self.available_beds > 0
    }

    /// Whether this room may take a registrant of `gender`.
    pub fn accepts(&self, gender: Gender, allow_cross_gender: bool) -> bool {
        allow_cross_gender || self.gender == gender
    }

    /// Whether the bed counters are within bounds.
    pub fn counters_consistent(&self) -> bool {
        self.total_beds > 0 && (0..=self.total_beds).contains(&self.available_beds)
    }
}

/// A room row supplied by bulk import.
///
/// Imported rooms always start empty: `available_beds = total_beds`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewRoom {
    /// Wing label.
    #[validate(length(min = 1, max = 64, message = "wing must not be empty"))]
    pub wing: String,
    /// Room number.
    #[validate(length(min = 1, max = 32, message = "room number must not be empty"))]
    pub room_number: String,
    /// Room gender.
    pub gender: Gender,
    /// Bed count.
    #[validate(range(min = 1, max = 64, message = "total beds must be between 1 and 64"))]
    pub total_beds: i32,
    /// Optional bed labels.
    #[serde(default)]
    pub bed_numbers: Option<Vec<String>>,
    /// Reserved-pool marker.
    #[serde(default)]
    pub is_vip_room: bool,
}

impl NewRoom {
    /// Validate field constraints plus the bed label list.
    pub fn check(&self) -> Result<(), AppError> {
        self.validate().map_err(|e| {
            AppError::validation(format!("Invalid room '{}': {e}", self.room_number))
        })?;

        if self.wing.trim().is_empty() || self.room_number.trim().is_empty() {
            return Err(AppError::validation(
                "Room wing and number must not be blank",
            ));
        }

        if let Some(beds) = &self.bed_numbers {
            if beds.len() != self.total_beds as usize {
                return Err(AppError::validation(format!(
                    "Room '{}' lists {} bed numbers but has {} beds",
                    self.room_number,
                    beds.len(),
                    self.total_beds
                )));
            }
            if beds.iter().any(|b| b.trim().is_empty()) {
                return Err(AppError::validation(format!(
                    "Room '{}' has a blank bed number",
                    self.room_number
                )));
            }
        }

        Ok(())
    }

    /// Materialize the row as the store will persist it.
    pub fn into_room(self, id: RoomId, now: DateTime<Utc>) -> Room {
        Room {
            id,
            wing: self.wing.trim().to_string(),
            room_number: self.room_number.trim().to_string(),
            gender: self.gender,
            total_beds: self.total_beds,
            available_beds: self.total_beds,
            bed_numbers: self.bed_numbers,
            is_vip_room: self.is_vip_room,
            last_assigned: None,
            created_at: now,
            updated_at: now,
        }
    }
}
