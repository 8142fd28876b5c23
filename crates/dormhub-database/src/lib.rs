//! # dormhub-database
//!
//! The transactional inventory store behind DormHub's allocator.
//!
//! [`InventoryStore`] is the seam: every method that mutates a room counter,
//! a tag flag, or a registrant runs as one atomic transaction that
//! re-validates what it consumes. Two implementations are provided:
//! - [`PgInventoryStore`]: PostgreSQL, compare-and-swap `UPDATE` statements
//! - [`MemoryInventoryStore`]: in-process, a Tokio mutex held per commit

pub mod connection;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use store::memory::MemoryInventoryStore;
pub use store::postgres::PgInventoryStore;
pub use store::{
    CommittedRegistration, InventoryStore, PairingOutcome, RegistrationPlan, ReleaseReport,
};
