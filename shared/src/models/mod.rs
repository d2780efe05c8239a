//! Data models
//!
//! Shared between org-server and its API clients.
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY).

use serde::{Deserialize, Serialize};

pub mod department;
pub mod employee;

// Re-exports
pub use department::*;
pub use employee::*;

/// List ordering; ties are broken by id
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Name,
    CreatedAt,
}
