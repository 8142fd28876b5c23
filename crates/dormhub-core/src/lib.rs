//! # dormhub-core
//!
//! Core crate for DormHub. Contains configuration schemas, typed
//! identifiers, the shared `Gender` value, inventory change events,
//! and the unified error system.
//!
//! This crate has **no** internal dependencies on other DormHub crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
