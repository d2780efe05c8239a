//! Read interfaces the engine walks, and their SQLite implementation

use shared::models::Employee;
use sqlx::SqliteConnection;

use super::HierarchyError;
use crate::db::repository::{department, employee};

/// Parent-pointer view of the department forest
#[allow(async_fn_in_trait)]
pub trait DepartmentGraph {
    /// `None` if the department does not exist, `Some(parent)` otherwise
    async fn parent_of(&mut self, id: i64) -> Result<Option<Option<i64>>, HierarchyError>;

    /// Direct sub-departments
    async fn children_of(&mut self, id: i64) -> Result<Vec<i64>, HierarchyError>;

    async fn department_count(&mut self) -> Result<usize, HierarchyError>;
}

/// Employee membership view
#[allow(async_fn_in_trait)]
pub trait Roster {
    /// `None` if the employee does not exist
    async fn department_of(&mut self, employee_id: i64) -> Result<Option<i64>, HierarchyError>;

    /// Department the employee manages, if any
    async fn managed_by(&mut self, employee_id: i64) -> Result<Option<i64>, HierarchyError>;

    async fn members_of(&mut self, department_ids: &[i64]) -> Result<Vec<Employee>, HierarchyError>;
}

/// Graph backed by a live connection or an open transaction
pub struct SqlGraph<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> SqlGraph<'c> {
    pub fn new(conn: &'c mut SqliteConnection) -> Self {
        Self { conn }
    }
}

impl DepartmentGraph for SqlGraph<'_> {
    async fn parent_of(&mut self, id: i64) -> Result<Option<Option<i64>>, HierarchyError> {
        Ok(department::parent_of(&mut *self.conn, id).await?)
    }

    async fn children_of(&mut self, id: i64) -> Result<Vec<i64>, HierarchyError> {
        Ok(department::find_children(&mut *self.conn, id).await?)
    }

    async fn department_count(&mut self) -> Result<usize, HierarchyError> {
        Ok(department::count(&mut *self.conn).await? as usize)
    }
}

impl Roster for SqlGraph<'_> {
    async fn department_of(&mut self, employee_id: i64) -> Result<Option<i64>, HierarchyError> {
        Ok(employee::department_of(&mut *self.conn, employee_id).await?)
    }

    async fn managed_by(&mut self, employee_id: i64) -> Result<Option<i64>, HierarchyError> {
        Ok(department::find_by_manager_id(&mut *self.conn, employee_id)
            .await?
            .map(|d| d.id))
    }

    async fn members_of(&mut self, department_ids: &[i64]) -> Result<Vec<Employee>, HierarchyError> {
        Ok(employee::find_by_department_ids(&mut *self.conn, department_ids).await?)
    }
}
