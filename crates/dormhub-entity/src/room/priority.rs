//! Room-completion priority.
//!
//! Partially occupied rooms are filled before empty ones are opened: the
//! room with the highest occupancy comes first, ties broken by ascending
//! room number.

use std::cmp::Ordering;

use super::model::Room;

/// Ordering of two rooms under room-completion priority.
pub fn completion_order(a: &Room, b: &Room) -> Ordering {
    b.occupancy()
        .cmp(&a.occupancy())
        .then_with(|| a.room_number.cmp(&b.room_number))
}

/// Sort rooms in place, highest priority first.
pub fn sort_by_completion_priority(rooms: &mut [Room]) {
    rooms.sort_by(completion_order);
}
