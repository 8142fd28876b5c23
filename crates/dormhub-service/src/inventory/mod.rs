//! Bulk inventory import and listings.

pub mod service;

pub use service::InventoryService;
