//! Transport-agnostic error classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error kind derived from an [`ErrorCode`]
///
/// The boundary layer maps a kind to its transport status; callers that only
/// care about the class of failure match on this instead of individual codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// A referenced entity does not exist
    NotFound,
    /// Uniqueness or dependency conflict
    Conflict,
    /// Malformed input or a rejected tree shape
    Validation,
    /// Storage or unexpected failure
    Internal,
}

impl ErrorKind {
    /// Get the string name for this kind
    pub fn name(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::Validation => "validation",
            Self::Internal => "internal",
        }
    }
}

impl ErrorCode {
    /// Get the kind for this error code
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound
            | Self::EmployeeNotFound
            | Self::DepartmentNotFound
            | Self::ParentDepartmentNotFound
            | Self::ManagerNotFound => ErrorKind::NotFound,

            Self::AlreadyExists
            | Self::ReferenceConflict
            | Self::NationalIdExists
            | Self::SecondaryIdExists
            | Self::EmployeeIsManager
            | Self::DepartmentHasChildren
            | Self::DepartmentHasMembers
            | Self::ManagerReassignmentRequired => ErrorKind::Conflict,

            Self::InvalidRequest
            | Self::RequiredField
            | Self::ValueOutOfRange
            | Self::InvalidNationalId
            | Self::InvalidSecondaryId
            | Self::ManagerNotInDepartment
            | Self::HierarchyCycle => ErrorKind::Validation,

            Self::Success
            | Self::InternalError
            | Self::DatabaseError
            | Self::HierarchyCorrupted
            | Self::RequestCancelled
            | Self::RequestTimeout => ErrorKind::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_of_codes() {
        assert_eq!(ErrorCode::EmployeeNotFound.kind(), ErrorKind::NotFound);
        assert_eq!(ErrorCode::NationalIdExists.kind(), ErrorKind::Conflict);
        assert_eq!(ErrorCode::HierarchyCycle.kind(), ErrorKind::Validation);
        assert_eq!(ErrorCode::ManagerNotInDepartment.kind(), ErrorKind::Validation);
        assert_eq!(ErrorCode::HierarchyCorrupted.kind(), ErrorKind::Internal);
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(ErrorKind::NotFound.name(), "not_found");
        assert_eq!(ErrorKind::Conflict.name(), "conflict");
        assert_eq!(ErrorKind::Validation.name(), "validation");
        assert_eq!(ErrorKind::Internal.name(), "internal");
    }
}
