//! Registrant lifecycle: registration, identity edits, and release.

pub mod service;

pub use service::RegistrationService;
