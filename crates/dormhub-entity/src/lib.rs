//! # dormhub-entity
//!
//! Domain entity models for DormHub. Every struct in this crate
//! represents a database table row or a domain value object. Row types
//! derive `sqlx::FromRow`; request types derive `validator::Validate`.

pub mod registrant;
pub mod room;
pub mod tag;

pub use dormhub_core::types::Gender;
