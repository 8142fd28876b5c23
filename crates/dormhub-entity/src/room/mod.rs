//! Room entity, bed labelling, and room-completion priority.

pub mod bed;
pub mod model;
pub mod priority;

pub use bed::bed_label;
pub use model::{NewRoom, Room};
pub use priority::{completion_order, sort_by_completion_priority};
