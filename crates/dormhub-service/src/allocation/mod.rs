//! Room-bed and tag allocation for new registrants.

pub mod allocator;
pub mod retry;
pub mod selection;

pub use allocator::{Allocation, Allocator};
pub use retry::RetryPolicy;
