//! Employee Model

use serde::{Deserialize, Serialize};

use super::SortKey;

/// Employee entity
///
/// `national_id` and `secondary_id` are stored in normalised form
/// (see [`crate::validation`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Employee {
    pub id: i64,
    pub name: String,
    pub national_id: String,
    pub secondary_id: Option<String>,
    pub department_id: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create employee payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeCreate {
    pub name: String,
    pub national_id: String,
    #[serde(default)]
    pub secondary_id: Option<String>,
    pub department_id: i64,
}

/// Update employee payload
///
/// Absent fields are left unchanged. An empty `secondary_id` clears it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmployeeUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub national_id: Option<String>,
    #[serde(default)]
    pub secondary_id: Option<String>,
    #[serde(default)]
    pub department_id: Option<i64>,
}

/// Employee with department and manager names (detail view)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct EmployeeDetail {
    pub id: i64,
    pub name: String,
    pub national_id: String,
    pub secondary_id: Option<String>,
    pub department_id: i64,
    pub department_name: String,
    pub manager_id: i64,
    pub manager_name: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Employee list query (`GET /api/employees?name=..&page=..`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmployeeQuery {
    /// Case-insensitive substring of the name
    pub name: Option<String>,
    /// Exact national ID, any formatting
    pub national_id: Option<String>,
    /// Exact secondary ID, any formatting
    pub secondary_id: Option<String>,
    pub department_id: Option<i64>,
    #[serde(default)]
    pub sort: SortKey,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}
