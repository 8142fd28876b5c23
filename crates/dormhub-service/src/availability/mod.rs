//! Read-only availability snapshots and live feeds for pickers.

pub mod feed;

pub use feed::{
    AvailabilityService, AvailabilitySnapshot, AvailabilityUpdate, AvailabilityWatch, Subscription,
};
