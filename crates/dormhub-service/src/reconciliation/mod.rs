//! Completion of pending room and tag assignments.

pub mod sweeper;

pub use sweeper::{SweepReport, Sweeper};
