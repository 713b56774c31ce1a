//! Shared result alias.

use crate::error::AppError;

/// Result alias used across every CrewChat crate.
pub type AppResult<T> = Result<T, AppError>;
