//! HTTP handlers, one module per domain.

pub mod availability;
pub mod health;
pub mod inventory;
pub mod reconciliation;
pub mod registration;
