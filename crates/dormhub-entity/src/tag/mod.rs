//! Tag entity and serial ordering.

pub mod model;
pub mod number;

pub use model::{NewTag, Tag};
pub use number::{TagNumberKey, sort_by_tag_number, tag_number_order};
