//! Background reconciliation for DormHub.
//!
//! This crate provides:
//! - A single-slot coalescing queue of sweep requests
//! - A change-feed trigger that requests a sweep when inventory frees up
//! - A cron scheduler that requests periodic sweeps
//! - A runner that executes sweeps one at a time until shutdown

pub mod queue;
pub mod runner;
pub mod scheduler;
pub mod trigger;

pub use queue::{Enqueued, SweepQueue, SweepReason, SweepRequests};
pub use runner::SweepRunner;
pub use scheduler::CronScheduler;
pub use trigger::ChangeFeedTrigger;
