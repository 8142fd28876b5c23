//! Registrant entity and assignment status.

pub mod model;
pub mod status;

pub use model::{IdentityUpdate, NewRegistrant, Registrant, RegistrationRequest};
pub use status::AssignmentStatus;
