//! Candidate vetting for registrant-selected rooms and tags.
//!
//! A selection is a hint from a picker that may be stale. A selection that
//! names nothing, or a room the registrant may not occupy, is rejected. A
//! selection whose resource has since been consumed yields `None` and the
//! allocator falls back to automatic choice.

use dormhub_core::error::AppError;
use dormhub_core::types::{Gender, RoomId, TagId};
use dormhub_entity::room::Room;
use dormhub_entity::tag::Tag;

/// Genders whose rooms a registrant may be placed in.
pub fn room_pool(gender: Gender, allow_cross_gender: bool) -> Vec<Gender> {
    if allow_cross_gender {
        Gender::ALL.to_vec()
    } else {
        vec![gender]
    }
}

/// Vet a selected room. `Ok(None)` means the room is full.
pub fn vet_selected_room(
    id: RoomId,
    room: Option<Room>,
    gender: Gender,
    allow_cross_gender: bool,
) -> Result<Option<Room>, AppError> {
    let room = room.ok_or_else(|| AppError::validation(format!("Selected room {id} does not exist")))?;
    if !room.accepts(gender, allow_cross_gender) {
        return Err(AppError::validation(format!(
            "Room '{}' is reserved for {} registrants",
            room.room_number, room.gender
        )));
    }
    Ok(room.has_vacancy().then_some(room))
}

/// Vet a selected tag. `Ok(None)` means the tag is already assigned.
pub fn vet_selected_tag(id: TagId, tag: Option<Tag>) -> Result<Option<Tag>, AppError> {
    let tag = tag.ok_or_else(|| AppError::validation(format!("Selected tag {id} does not exist")))?;
    Ok((!tag.is_assigned).then_some(tag))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use dormhub_core::error::ErrorKind;

    use super::*;

    fn room(gender: Gender, available: i32) -> Room {
        let now = Utc::now();
        Room {
            id: RoomId::new(),
            wing: "South".to_string(),
            room_number: "S1".to_string(),
            gender,
            total_beds: 2,
            available_beds: available,
            bed_numbers: None,
            is_vip_room: false,
            last_assigned: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_unknown_room_is_rejected() {
        let err = vet_selected_room(RoomId::new(), None, Gender::Male, false)
            .expect_err("unknown");
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[test]
    fn test_gender_mismatch_needs_cross_gender() {
        let r = room(Gender::Female, 1);
        assert!(vet_selected_room(r.id, Some(r.clone()), Gender::Male, false).is_err());
        let vetted = vet_selected_room(r.id, Some(r), Gender::Male, true).expect("allowed");
        assert!(vetted.is_some());
    }

    #[test]
    fn test_full_room_falls_back() {
        let r = room(Gender::Male, 0);
        assert!(vet_selected_room(r.id, Some(r), Gender::Male, false)
            .expect("not an error")
            .is_none());
    }

    #[test]
    fn test_cross_gender_pool_covers_both() {
        assert_eq!(room_pool(Gender::Female, false), vec![Gender::Female]);
        assert_eq!(room_pool(Gender::Female, true).len(), 2);
    }
}
