use std::collections::{HashSet, VecDeque};

use super::{DepartmentGraph, HierarchyError};

/// Lazy breadth-first walk over a sub-tree.
///
/// Children are fetched only when their parent is yielded. The walk cannot be
/// restarted; once it returns `None` or an error it stays exhausted. Seeing a
/// department twice, or more departments than exist, means the stored graph
/// has a cycle and is reported as [`HierarchyError::CorruptHierarchy`].
pub struct SubtreeWalk<'g, G> {
    graph: &'g mut G,
    queue: VecDeque<i64>,
    visited: HashSet<i64>,
    bound: usize,
    done: bool,
}

impl<'g, G: DepartmentGraph> SubtreeWalk<'g, G> {
    pub(super) fn new(graph: &'g mut G, root: i64, bound: usize) -> Self {
        Self {
            graph,
            queue: VecDeque::from([root]),
            visited: HashSet::from([root]),
            bound: bound.max(1),
            done: false,
        }
    }

    pub async fn next(&mut self) -> Option<Result<i64, HierarchyError>> {
        if self.done {
            return None;
        }
        let Some(id) = self.queue.pop_front() else {
            self.done = true;
            return None;
        };

        let children = match self.graph.children_of(id).await {
            Ok(children) => children,
            Err(e) => {
                self.done = true;
                return Some(Err(e));
            }
        };
        for child in children {
            if !self.visited.insert(child) || self.visited.len() > self.bound {
                tracing::error!(department_id = child, "Cycle detected below department");
                self.done = true;
                return Some(Err(HierarchyError::CorruptHierarchy(child)));
            }
            self.queue.push_back(child);
        }
        Some(Ok(id))
    }

    /// Departments discovered so far, yielded or queued
    pub fn discovered(&self) -> usize {
        self.visited.len()
    }
}
