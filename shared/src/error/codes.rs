//! Unified error codes for the organisation service
//!
//! Error codes are organized by range:
//! - 0xxx: General errors
//! - 1xxx: Employee errors
//! - 2xxx: Department / hierarchy errors
//! - 9xxx: System errors
//!
//! On the wire a code is its stable snake_case name (`"national_id_exists"`);
//! the numeric value is kept for logs and metrics.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// A referenced entity changed underneath the request
    ReferenceConflict = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Employee ====================
    /// Employee not found
    EmployeeNotFound = 1001,
    /// National ID failed checksum validation
    InvalidNationalId = 1002,
    /// Secondary ID failed format validation
    InvalidSecondaryId = 1003,
    /// National ID already registered to another employee
    NationalIdExists = 1004,
    /// Secondary ID already registered to another employee
    SecondaryIdExists = 1005,
    /// Employee manages a department and cannot leave or be removed
    EmployeeIsManager = 1006,

    // ==================== 2xxx: Department ====================
    /// Department not found
    DepartmentNotFound = 2001,
    /// Parent department not found
    ParentDepartmentNotFound = 2002,
    /// Manager (employee) not found
    ManagerNotFound = 2003,
    /// Manager does not belong to the department
    ManagerNotInDepartment = 2004,
    /// Reparenting would create a cycle
    HierarchyCycle = 2005,
    /// Department still has sub-departments
    DepartmentHasChildren = 2006,
    /// Department still has members other than its manager
    DepartmentHasMembers = 2007,
    /// Root department manager has nowhere to go
    ManagerReassignmentRequired = 2008,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Stored hierarchy contains a cycle or dangling parent
    HierarchyCorrupted = 9004,
    /// Request was cancelled by the caller
    RequestCancelled = 9005,
    /// Request deadline elapsed
    RequestTimeout = 9006,
}

impl ErrorCode {
    /// Numeric value of this code
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Whether this code represents success
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Stable machine-readable name, identical to the serialized form
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::Success => "success",
            ErrorCode::NotFound => "not_found",
            ErrorCode::AlreadyExists => "already_exists",
            ErrorCode::InvalidRequest => "invalid_request",
            ErrorCode::ReferenceConflict => "reference_conflict",
            ErrorCode::RequiredField => "required_field",
            ErrorCode::ValueOutOfRange => "value_out_of_range",

            ErrorCode::EmployeeNotFound => "employee_not_found",
            ErrorCode::InvalidNationalId => "invalid_national_id",
            ErrorCode::InvalidSecondaryId => "invalid_secondary_id",
            ErrorCode::NationalIdExists => "national_id_exists",
            ErrorCode::SecondaryIdExists => "secondary_id_exists",
            ErrorCode::EmployeeIsManager => "employee_is_manager",

            ErrorCode::DepartmentNotFound => "department_not_found",
            ErrorCode::ParentDepartmentNotFound => "parent_department_not_found",
            ErrorCode::ManagerNotFound => "manager_not_found",
            ErrorCode::ManagerNotInDepartment => "manager_not_in_department",
            ErrorCode::HierarchyCycle => "hierarchy_cycle",
            ErrorCode::DepartmentHasChildren => "department_has_children",
            ErrorCode::DepartmentHasMembers => "department_has_members",
            ErrorCode::ManagerReassignmentRequired => "manager_reassignment_required",

            ErrorCode::InternalError => "internal_error",
            ErrorCode::DatabaseError => "database_error",
            ErrorCode::HierarchyCorrupted => "hierarchy_corrupted",
            ErrorCode::RequestCancelled => "request_cancelled",
            ErrorCode::RequestTimeout => "request_timeout",
        }
    }

    /// Default human-readable message
    pub const fn message(&self) -> &'static str {
        match self {
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::ReferenceConflict => "Referenced entity no longer exists",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            ErrorCode::EmployeeNotFound => "Employee not found",
            ErrorCode::InvalidNationalId => "Invalid national ID",
            ErrorCode::InvalidSecondaryId => "Invalid secondary ID",
            ErrorCode::NationalIdExists => "National ID is already registered",
            ErrorCode::SecondaryIdExists => "Secondary ID is already registered",
            ErrorCode::EmployeeIsManager => "Employee manages a department",

            ErrorCode::DepartmentNotFound => "Department not found",
            ErrorCode::ParentDepartmentNotFound => "Parent department not found",
            ErrorCode::ManagerNotFound => "Manager not found",
            ErrorCode::ManagerNotInDepartment => "Manager must belong to the department",
            ErrorCode::HierarchyCycle => "Operation would create a cycle in the department hierarchy",
            ErrorCode::DepartmentHasChildren => "Department still has sub-departments",
            ErrorCode::DepartmentHasMembers => "Department still has members",
            ErrorCode::ManagerReassignmentRequired => {
                "Department manager must be reassigned before deletion"
            }

            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::HierarchyCorrupted => "Department hierarchy is corrupted",
            ErrorCode::RequestCancelled => "Request was cancelled",
            ErrorCode::RequestTimeout => "Request timed out",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error returned when a numeric value does not name a known [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid error code: {0}")]
pub struct InvalidErrorCode(pub u16);

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        let code = match value {
            0 => ErrorCode::Success,
            3 => ErrorCode::NotFound,
            4 => ErrorCode::AlreadyExists,
            5 => ErrorCode::InvalidRequest,
            6 => ErrorCode::ReferenceConflict,
            7 => ErrorCode::RequiredField,
            8 => ErrorCode::ValueOutOfRange,

            1001 => ErrorCode::EmployeeNotFound,
            1002 => ErrorCode::InvalidNationalId,
            1003 => ErrorCode::InvalidSecondaryId,
            1004 => ErrorCode::NationalIdExists,
            1005 => ErrorCode::SecondaryIdExists,
            1006 => ErrorCode::EmployeeIsManager,

            2001 => ErrorCode::DepartmentNotFound,
            2002 => ErrorCode::ParentDepartmentNotFound,
            2003 => ErrorCode::ManagerNotFound,
            2004 => ErrorCode::ManagerNotInDepartment,
            2005 => ErrorCode::HierarchyCycle,
            2006 => ErrorCode::DepartmentHasChildren,
            2007 => ErrorCode::DepartmentHasMembers,
            2008 => ErrorCode::ManagerReassignmentRequired,

            9001 => ErrorCode::InternalError,
            9002 => ErrorCode::DatabaseError,
            9004 => ErrorCode::HierarchyCorrupted,
            9005 => ErrorCode::RequestCancelled,
            9006 => ErrorCode::RequestTimeout,

            other => return Err(InvalidErrorCode(other)),
        };
        Ok(code)
    }
}
