//! Shared value types used across DormHub crates.

pub mod gender;
pub mod id;

pub use gender::Gender;
pub use id::{RegistrantId, RoomId, TagId};
