//! # dormhub-service
//!
//! Business logic for DormHub. Services are constructed with an
//! `Arc<dyn InventoryStore>` and the shared [`EventBus`], and are cheap to
//! clone.
//!
//! - [`RegistrationService`]: retrying allocation, release, identity edits
//! - [`InventoryService`]: bulk room and tag import
//! - [`AvailabilityService`]: snapshots and live feeds for pickers
//! - [`Sweeper`]: completes pending assignments
//!
//! [`EventBus`]: dormhub_core::events::EventBus

pub mod allocation;
pub mod availability;
pub mod inventory;
pub mod reconciliation;
pub mod registration;

pub use allocation::{Allocation, Allocator, RetryPolicy};
pub use availability::{
    AvailabilityService, AvailabilitySnapshot, AvailabilityUpdate, AvailabilityWatch, Subscription,
};
pub use inventory::InventoryService;
pub use reconciliation::{SweepReport, Sweeper};
pub use registration::RegistrationService;
