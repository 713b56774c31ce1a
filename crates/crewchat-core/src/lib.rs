//! # crewchat-core
//!
//! Foundation crate shared by every other CrewChat crate:
//!
//! - Unified [`error::AppError`] / [`result::AppResult`] types
//! - Configuration schemas loaded from TOML + environment
//! - Newtype identifiers for domain entities

pub mod config;
pub mod error;
pub mod result;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
