//! Shared types for the organisation service
//!
//! Error types, response structures, the employee/department data model,
//! pagination and identifier validation. Nothing in here performs I/O.

pub mod error;
pub mod models;
pub mod pagination;
pub mod util;
pub mod validation;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCode, ErrorKind};
pub use pagination::{PageRequest, PaginatedResponse};
