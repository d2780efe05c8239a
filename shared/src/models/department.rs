//! Department Model

use serde::{Deserialize, Deserializer, Serialize};

use super::{Employee, SortKey};

/// Department entity
///
/// Departments form a forest through `parent_id`. Children are never stored
/// on the parent; they are resolved by lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Department {
    pub id: i64,
    pub name: String,
    pub manager_id: i64,
    pub parent_id: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create department payload
///
/// The manager is moved into the new department.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepartmentCreate {
    pub name: String,
    pub manager_id: i64,
    #[serde(default)]
    pub parent_id: Option<i64>,
}

/// Update department payload
///
/// `parent_id`: absent = unchanged, `null` = make root, value = reparent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DepartmentUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub manager_id: Option<i64>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub parent_id: Option<Option<i64>>,
}

/// Create a department together with a brand-new manager
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepartmentFound {
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<i64>,
    pub manager: NewManager,
}

/// Manager created by [`DepartmentFound`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewManager {
    pub name: String,
    pub national_id: String,
    #[serde(default)]
    pub secondary_id: Option<String>,
}

/// Result of [`DepartmentFound`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoundedDepartment {
    pub department: Department,
    pub manager: Employee,
}

/// Delete options (`DELETE /api/departments/{id}?reassign_manager_to=..`)
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct DepartmentDelete {
    /// Department receiving the outgoing manager; defaults to the parent
    #[serde(default)]
    pub reassign_manager_to: Option<i64>,
    /// Delete the manager too when there is nowhere to move them
    #[serde(default)]
    pub remove_manager: bool,
}

/// Department with its manager's name (list view)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct DepartmentWithManager {
    pub id: i64,
    pub name: String,
    pub manager_id: i64,
    pub manager_name: String,
    pub parent_id: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerSummary {
    pub id: i64,
    pub name: String,
}

/// Department with its whole sub-tree (detail view)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentTree {
    pub id: i64,
    pub name: String,
    pub parent_id: Option<i64>,
    pub manager: ManagerSummary,
    pub created_at: i64,
    pub updated_at: i64,
    pub children: Vec<DepartmentTree>,
}

impl DepartmentTree {
    /// Number of departments in this tree, root included
    pub fn len(&self) -> usize {
        1 + self.children.iter().map(DepartmentTree::len).sum::<usize>()
    }

    /// Always false; a tree holds at least its root
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Ids in depth-first order
    pub fn ids(&self) -> Vec<i64> {
        let mut out = Vec::with_capacity(self.len());
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            out.push(node.id);
            stack.extend(node.children.iter().rev());
        }
        out
    }
}

/// Department list query (`GET /api/departments?manager_name=..`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DepartmentQuery {
    /// Case-insensitive substring of the name
    pub name: Option<String>,
    /// Case-insensitive substring of the manager's name
    pub manager_name: Option<String>,
    pub parent_id: Option<i64>,
    #[serde(default)]
    pub sort: SortKey,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

/// Distinguishes an explicit `null` from an absent field
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
