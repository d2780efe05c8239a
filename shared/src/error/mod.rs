//! Unified error system for the organisation service
//!
//! This module provides the error handling system shared by every layer:
//! - [`ErrorCode`]: Standardized error codes for all error types
//! - [`ErrorKind`]: Transport-agnostic classification (not found, conflict, validation, internal)
//! - [`AppError`]: Rich error type with codes, messages, and details
//! - [`ApiResponse`]: Unified API response format
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors
//! - 1xxx: Employee errors
//! - 2xxx: Department errors
//! - 9xxx: System errors
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode, ErrorKind, ApiResponse};
//!
//! let err = AppError::new(ErrorCode::NationalIdExists)
//!     .with_detail("field", "national_id");
//! assert_eq!(err.kind(), ErrorKind::Conflict);
//!
//! let response = ApiResponse::<()>::error(&err);
//! assert_eq!(response.code, ErrorCode::NationalIdExists);
//! ```

mod codes;
mod http;
mod kind;
mod types;

pub use codes::{ErrorCode, InvalidErrorCode};
pub use kind::ErrorKind;
pub use types::{ApiResponse, AppError, AppResult};
