//! Convenience result type alias for DormHub.

use crate::error::AppError;

/// A specialized `Result` type for DormHub operations.
pub type AppResult<T> = Result<T, AppError>;
