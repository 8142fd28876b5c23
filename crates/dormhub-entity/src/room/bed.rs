//! Bed label assignment.
//!
//! The next bed handed out is the one at index `total_beds - available_beds`
//! of the room's pre-assignment state. Listed rooms use their own label at
//! that index; other rooms get a zero-padded sequence number.

use super::model::Room;

/// Label for the bed the next assignment in `room` will take.
///
/// `room` must be the state read before the decrement.
///
/// The index follows occupancy, not which beds are held. After a release
/// from the middle of a room the next label can match one a current
/// occupant already has, so labels are not unique per room.
pub fn bed_label(room: &Room, vip_prefix: &str) -> String {
    let index = room.occupancy().max(0) as usize;

    if let Some(label) = room
        .bed_numbers
        .as_ref()
        .and_then(|beds| beds.get(index))
        .filter(|label| !label.trim().is_empty())
    {
        return label.clone();
    }

    let sequence = index + 1;
    if room.is_vip_room {
        format!("{vip_prefix}-{sequence:03}")
    } else {
        format!("{sequence:03}")
    }
}
