//! Shared helpers: error re-exports, logging and input validation

pub mod logger;
pub mod validation;

pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCode, ErrorKind};
