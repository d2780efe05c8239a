//! Department hierarchy engine
//!
//! Tree-shape logic over a parent-pointer graph. The engine only reads: it
//! answers sub-tree, ancestor-chain and cycle questions through the
//! [`DepartmentGraph`] and [`Roster`] interfaces and never mutates storage.
//!
//! Traversals are iterative and bounded by the department count, so a
//! corrupted (cyclic) table yields [`HierarchyError::CorruptHierarchy`]
//! instead of looping.

mod graph;
mod memory;
mod walk;

pub use graph::{DepartmentGraph, Roster, SqlGraph};
pub use memory::MemoryGraph;
pub use walk::SubtreeWalk;

use std::collections::{BTreeSet, HashSet};

use shared::error::{AppError, ErrorCode};
use shared::models::Employee;
use thiserror::Error;

use crate::db::repository::RepoError;

#[derive(Debug, Error)]
pub enum HierarchyError {
    #[error("Department {0} not found")]
    DepartmentNotFound(i64),

    #[error("Employee {0} not found")]
    EmployeeNotFound(i64),

    /// Stored graph has a cycle or a dangling parent at this department
    #[error("Department hierarchy is corrupted at department {0}")]
    CorruptHierarchy(i64),

    #[error(transparent)]
    Store(#[from] RepoError),
}

impl From<HierarchyError> for AppError {
    fn from(err: HierarchyError) -> Self {
        match err {
            HierarchyError::DepartmentNotFound(id) => AppError::with_message(
                ErrorCode::DepartmentNotFound,
                format!("Department {id} not found"),
            )
            .with_detail("department_id", id),
            HierarchyError::EmployeeNotFound(id) => AppError::with_message(
                ErrorCode::EmployeeNotFound,
                format!("Employee {id} not found"),
            )
            .with_detail("employee_id", id),
            HierarchyError::CorruptHierarchy(id) => {
                tracing::error!(department_id = id, "Department hierarchy is corrupted");
                AppError::new(ErrorCode::HierarchyCorrupted).with_detail("department_id", id)
            }
            HierarchyError::Store(e) => e.into(),
        }
    }
}

pub type HierarchyResult<T> = Result<T, HierarchyError>;

/// Hierarchy queries over a graph `G`
pub struct Hierarchy<G> {
    graph: G,
}

impl<G: DepartmentGraph> Hierarchy<G> {
    pub fn new(graph: G) -> Self {
        Self { graph }
    }

    /// Start a lazy walk of the sub-tree rooted at `root`
    pub async fn walk(&mut self, root: i64) -> HierarchyResult<SubtreeWalk<'_, G>> {
        if self.graph.parent_of(root).await?.is_none() {
            return Err(HierarchyError::DepartmentNotFound(root));
        }
        let bound = self.graph.department_count().await?;
        Ok(SubtreeWalk::new(&mut self.graph, root, bound))
    }

    /// Every department reachable from `root` through child links, `root` included
    pub async fn resolve_subtree(&mut self, root: i64) -> HierarchyResult<BTreeSet<i64>> {
        let mut walk = self.walk(root).await?;
        let mut ids = BTreeSet::new();
        while let Some(id) = walk.next().await {
            ids.insert(id?);
        }
        Ok(ids)
    }

    /// Ancestors of `id`, nearest first, ending at the root. `id` itself is not included.
    pub async fn resolve_ancestors(&mut self, id: i64) -> HierarchyResult<Vec<i64>> {
        let Some(mut next) = self.graph.parent_of(id).await? else {
            return Err(HierarchyError::DepartmentNotFound(id));
        };
        let bound = self.graph.department_count().await?;

        let mut chain = Vec::new();
        let mut seen = HashSet::from([id]);
        while let Some(parent) = next {
            if !seen.insert(parent) || chain.len() >= bound {
                tracing::error!(department_id = id, at = parent, "Cycle in ancestor chain");
                return Err(HierarchyError::CorruptHierarchy(parent));
            }
            chain.push(parent);
            next = match self.graph.parent_of(parent).await? {
                Some(p) => p,
                None => {
                    tracing::error!(department_id = id, missing = parent, "Dangling parent");
                    return Err(HierarchyError::CorruptHierarchy(parent));
                }
            };
        }
        Ok(chain)
    }

    /// Whether making `candidate_parent_id` the parent of `department_id`
    /// would put `department_id` on its own ancestor chain.
    ///
    /// A cycle risk is a `true` result, never an error; missing departments are.
    pub async fn would_create_cycle(
        &mut self,
        department_id: i64,
        candidate_parent_id: i64,
    ) -> HierarchyResult<bool> {
        if self.graph.parent_of(department_id).await?.is_none() {
            return Err(HierarchyError::DepartmentNotFound(department_id));
        }
        if department_id == candidate_parent_id {
            return Ok(true);
        }
        let ancestors = self.resolve_ancestors(candidate_parent_id).await?;
        Ok(ancestors.contains(&department_id))
    }
}

impl<G: DepartmentGraph + Roster> Hierarchy<G> {
    /// Employees of the department `manager_id` manages and of every
    /// department below it. Empty when the employee manages nothing.
    pub async fn subordinate_employees(&mut self, manager_id: i64) -> HierarchyResult<Vec<Employee>> {
        if self.graph.department_of(manager_id).await?.is_none() {
            return Err(HierarchyError::EmployeeNotFound(manager_id));
        }
        let Some(department_id) = self.graph.managed_by(manager_id).await? else {
            return Ok(Vec::new());
        };
        let ids: Vec<i64> = self.resolve_subtree(department_id).await?.into_iter().collect();
        self.graph.members_of(&ids).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    //   1 ── 2 ── 3 ── 4        6 ── 7
    //   └─── 5
    fn forest() -> MemoryGraph {
        let mut g = MemoryGraph::new();
        g.insert(1, None)
            .insert(2, Some(1))
            .insert(3, Some(2))
            .insert(4, Some(3))
            .insert(5, Some(1))
            .insert(6, None)
            .insert(7, Some(6));
        g
    }

    fn employee(id: i64, name: &str, department_id: i64) -> Employee {
        Employee {
            id,
            name: name.to_string(),
            national_id: format!("{id:011}"),
            secondary_id: None,
            department_id,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[tokio::test]
    async fn test_self_parenting_is_always_a_cycle() {
        let mut h = Hierarchy::new(forest());
        for id in 1..=7 {
            assert!(h.would_create_cycle(id, id).await.unwrap(), "{id}");
        }
    }

    #[tokio::test]
    async fn test_ancestor_chain_is_ordered_to_root() {
        let mut h = Hierarchy::new(forest());
        assert_eq!(h.resolve_ancestors(4).await.unwrap(), vec![3, 2, 1]);
        assert_eq!(h.resolve_ancestors(7).await.unwrap(), vec![6]);
        assert!(h.resolve_ancestors(1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ancestor_under_descendant_is_a_cycle() {
        let mut h = Hierarchy::new(forest());
        for ancestor in h.resolve_ancestors(4).await.unwrap() {
            assert!(h.would_create_cycle(ancestor, 4).await.unwrap(), "{ancestor}");
        }
        assert!(h.would_create_cycle(2, 3).await.unwrap());
    }

    #[tokio::test]
    async fn test_unrelated_or_upward_moves_are_not_cycles() {
        let mut h = Hierarchy::new(forest());
        assert!(!h.would_create_cycle(4, 5).await.unwrap());
        assert!(!h.would_create_cycle(4, 6).await.unwrap());
        assert!(!h.would_create_cycle(2, 7).await.unwrap());
        assert!(!h.would_create_cycle(4, 1).await.unwrap());
        assert!(!h.would_create_cycle(6, 5).await.unwrap());
    }

    #[tokio::test]
    async fn test_subtree_includes_root() {
        let mut h = Hierarchy::new(forest());
        let all: Vec<i64> = h.resolve_subtree(1).await.unwrap().into_iter().collect();
        assert_eq!(all, vec![1, 2, 3, 4, 5]);
        let leaf: Vec<i64> = h.resolve_subtree(4).await.unwrap().into_iter().collect();
        assert_eq!(leaf, vec![4]);
    }

    #[tokio::test]
    async fn test_walk_is_breadth_first_and_lazy() {
        let mut h = Hierarchy::new(forest());
        let mut walk = h.walk(1).await.unwrap();
        assert_eq!(walk.next().await.unwrap().unwrap(), 1);
        assert_eq!(walk.discovered(), 3);
        let mut rest = Vec::new();
        while let Some(id) = walk.next().await {
            rest.push(id.unwrap());
        }
        assert_eq!(rest, vec![2, 5, 3, 4]);
        assert!(walk.next().await.is_none());
    }

    #[tokio::test]
    async fn test_missing_departments_are_not_found() {
        let mut h = Hierarchy::new(forest());
        assert!(matches!(
            h.resolve_subtree(99).await,
            Err(HierarchyError::DepartmentNotFound(99))
        ));
        assert!(matches!(
            h.resolve_ancestors(99).await,
            Err(HierarchyError::DepartmentNotFound(99))
        ));
        assert!(matches!(
            h.would_create_cycle(99, 1).await,
            Err(HierarchyError::DepartmentNotFound(99))
        ));
        assert!(matches!(
            h.would_create_cycle(1, 99).await,
            Err(HierarchyError::DepartmentNotFound(99))
        ));
        assert!(matches!(
            h.would_create_cycle(99, 99).await,
            Err(HierarchyError::DepartmentNotFound(99))
        ));
    }

    #[tokio::test]
    async fn test_stored_cycle_is_reported_not_looped() {
        let mut g = forest();
        g.insert(10, Some(11)).insert(11, Some(12)).insert(12, Some(10));
        let mut h = Hierarchy::new(g);

        assert!(matches!(
            h.resolve_ancestors(10).await,
            Err(HierarchyError::CorruptHierarchy(_))
        ));
        assert!(matches!(
            h.resolve_subtree(11).await,
            Err(HierarchyError::CorruptHierarchy(_))
        ));
        assert!(matches!(
            h.would_create_cycle(1, 12).await,
            Err(HierarchyError::CorruptHierarchy(_))
        ));
    }

    #[tokio::test]
    async fn test_dangling_parent_is_corruption() {
        let mut g = forest();
        g.insert(20, Some(99));
        let mut h = Hierarchy::new(g);
        assert!(matches!(
            h.resolve_ancestors(20).await,
            Err(HierarchyError::CorruptHierarchy(99))
        ));
    }

    #[tokio::test]
    async fn test_reparent_moves_children_index() {
        let mut g = forest();
        g.insert(3, Some(6));
        let mut h = Hierarchy::new(g);
        let under_two: Vec<i64> = h.resolve_subtree(2).await.unwrap().into_iter().collect();
        assert_eq!(under_two, vec![2]);
        assert_eq!(h.resolve_ancestors(4).await.unwrap(), vec![3, 6]);
    }

    #[tokio::test]
    async fn test_subordinates_span_the_subtree() {
        let mut g = forest();
        g.add_employee(employee(100, "Ana", 2))
            .add_employee(employee(101, "Caio", 3))
            .add_employee(employee(102, "Bia", 4))
            .add_employee(employee(103, "Duda", 1))
            .add_employee(employee(104, "Edu", 7))
            .set_manager(2, 100)
            .set_manager(1, 103);
        let mut h = Hierarchy::new(g);

        let names: Vec<String> = h
            .subordinate_employees(100)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["Ana", "Bia", "Caio"]);

        assert_eq!(h.subordinate_employees(103).await.unwrap().len(), 4);
        assert!(h.subordinate_employees(101).await.unwrap().is_empty());
        assert!(matches!(
            h.subordinate_employees(999).await,
            Err(HierarchyError::EmployeeNotFound(999))
        ));
    }
}
