//! In-memory department arena
//!
//! Same contract as [`SqlGraph`](super::SqlGraph), without a database. The
//! arena does not reject cycles on insert so corrupted shapes can be built.

use std::collections::{BTreeMap, HashMap};

use shared::models::{Department, Employee};
use shared::util::name_key;

use super::{DepartmentGraph, HierarchyError, Roster};

#[derive(Debug, Clone, Default)]
pub struct MemoryGraph {
    parents: HashMap<i64, Option<i64>>,
    children: BTreeMap<i64, Vec<i64>>,
    /// employee id -> managed department
    managers: HashMap<i64, i64>,
    employees: Vec<Employee>,
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_departments<'a>(departments: impl IntoIterator<Item = &'a Department>) -> Self {
        let mut graph = Self::new();
        for d in departments {
            graph.insert(d.id, d.parent_id).set_manager(d.id, d.manager_id);
        }
        graph
    }

    /// Add or re-parent a department
    pub fn insert(&mut self, id: i64, parent_id: Option<i64>) -> &mut Self {
        if let Some(Some(old)) = self.parents.insert(id, parent_id)
            && let Some(siblings) = self.children.get_mut(&old)
        {
            siblings.retain(|&c| c != id);
        }
        if let Some(parent) = parent_id {
            self.children.entry(parent).or_default().push(id);
        }
        self
    }

    /// Make `employee_id` the only manager of `department_id`
    pub fn set_manager(&mut self, department_id: i64, employee_id: i64) -> &mut Self {
        self.managers.retain(|_, d| *d != department_id);
        self.managers.insert(employee_id, department_id);
        self
    }

    pub fn add_employee(&mut self, employee: Employee) -> &mut Self {
        self.employees.retain(|e| e.id != employee.id);
        self.employees.push(employee);
        self
    }
}

impl DepartmentGraph for MemoryGraph {
    async fn parent_of(&mut self, id: i64) -> Result<Option<Option<i64>>, HierarchyError> {
        Ok(self.parents.get(&id).copied())
    }

    async fn children_of(&mut self, id: i64) -> Result<Vec<i64>, HierarchyError> {
        Ok(self.children.get(&id).cloned().unwrap_or_default())
    }

    async fn department_count(&mut self) -> Result<usize, HierarchyError> {
        Ok(self.parents.len())
    }
}

impl Roster for MemoryGraph {
    async fn department_of(&mut self, employee_id: i64) -> Result<Option<i64>, HierarchyError> {
        Ok(self
            .employees
            .iter()
            .find(|e| e.id == employee_id)
            .map(|e| e.department_id))
    }

    async fn managed_by(&mut self, employee_id: i64) -> Result<Option<i64>, HierarchyError> {
        Ok(self.managers.get(&employee_id).copied())
    }

    async fn members_of(&mut self, department_ids: &[i64]) -> Result<Vec<Employee>, HierarchyError> {
        let mut members: Vec<Employee> = self
            .employees
            .iter()
            .filter(|e| department_ids.contains(&e.department_id))
            .cloned()
            .collect();
        members.sort_by_cached_key(|e| (name_key(&e.name), e.id));
        Ok(members)
    }
}
