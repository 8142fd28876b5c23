//! Repository implementations for rooms, tags, and registrants.
//!
//! Each repository reads through its pool. Writes that must be part of a
//! larger atomic unit are associated functions taking the open
//! transaction's connection.

pub mod registrant;
pub mod room;
pub mod tag;

pub use registrant::RegistrantRepository;
pub use room::RoomRepository;
pub use tag::TagRepository;

use dormhub_core::error::{AppError, ErrorKind};

/// Map a sqlx error to an [`AppError`], classifying by SQLSTATE.
///
/// Serialization failures and deadlocks are contention and surface as
/// [`ErrorKind::Conflict`]; unique violations as [`ErrorKind::Validation`].
pub(crate) fn db_error(context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |err| {
        let kind = match err
            .as_database_error()
            .and_then(|db| db.code())
            .as_deref()
        {
            Some("40001") | Some("40P01") => ErrorKind::Conflict,
            Some("23505") => ErrorKind::Validation,
            _ => ErrorKind::Database,
        };
        AppError::with_source(kind, format!("{context}: {err}"), err)
    }
}
