//! Department operations

use std::collections::HashMap;

use shared::models::{
    Department, DepartmentCreate, DepartmentDelete, DepartmentFound, DepartmentQuery,
    DepartmentTree, DepartmentUpdate, DepartmentWithManager, Employee, FoundedDepartment,
    ManagerSummary,
};
use shared::pagination::{PageRequest, PaginatedResponse};
use shared::util::{name_key, now_millis, snowflake_id};

use super::employee::ensure_identity_free;
use super::{CacheKey, OrgService, Stale, department_not_found, employee_is_manager};
use crate::audit_log;
use crate::core::RequestContext;
use crate::db::repository::department::{self as department_repo, DepartmentFilter};
use crate::db::repository::employee as employee_repo;
use crate::hierarchy::{Hierarchy, SqlGraph};
use crate::utils::validation::{
    MAX_NAME_LEN, validate_name, validate_national_id, validate_required_text,
    validate_secondary_id,
};
use crate::utils::{AppError, AppResult, ErrorCode};

fn manager_not_found(id: i64) -> AppError {
    AppError::with_message(ErrorCode::ManagerNotFound, format!("Manager {id} not found"))
        .with_detail("manager_id", id)
}

fn parent_not_found(id: i64) -> AppError {
    AppError::with_message(
        ErrorCode::ParentDepartmentNotFound,
        format!("Parent department {id} not found"),
    )
    .with_detail("parent_id", id)
}

/// Nest `rows` under `root_id`; siblings are ordered by folded name, then id
fn assemble_tree(root_id: i64, rows: Vec<DepartmentWithManager>) -> Option<DepartmentTree> {
    let mut by_parent: HashMap<Option<i64>, Vec<DepartmentWithManager>> = HashMap::new();
    let mut root = None;
    for row in rows {
        if row.id == root_id {
            root = Some(row);
        } else {
            by_parent.entry(row.parent_id).or_default().push(row);
        }
    }
    for siblings in by_parent.values_mut() {
        siblings.sort_by_cached_key(|d| (name_key(&d.name), d.id));
    }
    root.map(|row| attach(row, &mut by_parent))
}

fn attach(
    row: DepartmentWithManager,
    by_parent: &mut HashMap<Option<i64>, Vec<DepartmentWithManager>>,
) -> DepartmentTree {
    let children = by_parent
        .remove(&Some(row.id))
        .unwrap_or_default()
        .into_iter()
        .map(|child| attach(child, by_parent))
        .collect();
    DepartmentTree {
        id: row.id,
        name: row.name,
        parent_id: row.parent_id,
        manager: ManagerSummary {
            id: row.manager_id,
            name: row.manager_name,
        },
        created_at: row.created_at,
        updated_at: row.updated_at,
        children,
    }
}

impl OrgService {
    /// Create a department managed by an existing employee, who is moved into it
    pub async fn create_department(
        &self,
        ctx: &RequestContext,
        payload: DepartmentCreate,
    ) -> AppResult<Department> {
        let (write, department, manager) = ctx.run(async {
            let name = validate_name(&payload.name)?;

            let (gate, mut tx) = self.begin_write().await?;
            let manager = employee_repo::find_by_id(&mut *tx, payload.manager_id)
                .await?
                .ok_or_else(|| manager_not_found(payload.manager_id))?;
            if let Some(managed) = department_repo::find_by_manager_id(&mut *tx, manager.id).await? {
                return Err(employee_is_manager(manager.id, managed.id));
            }
            if let Some(parent_id) = payload.parent_id
                && department_repo::find_by_id(&mut *tx, parent_id).await?.is_none()
            {
                return Err(parent_not_found(parent_id));
            }

            let now = now_millis();
            let department = Department {
                id: snowflake_id(),
                name,
                manager_id: manager.id,
                parent_id: payload.parent_id,
                created_at: now,
                updated_at: now,
            };
            department_repo::insert(&mut *tx, &department).await?;
            employee_repo::set_department(&mut *tx, manager.id, department.id, now).await?;
            Ok(((gate, tx), department, manager))
        })
        .await?;
        self.commit(ctx, write, Stale::All).await?;

        audit_log!("create", "department", department.id);
        tracing::info!(
            department_id = department.id,
            manager_id = manager.id,
            moved_from = manager.department_id,
            "Department created"
        );
        Ok(department)
    }

    /// Create a department and its brand-new manager together
    pub async fn found_department(
        &self,
        ctx: &RequestContext,
        payload: DepartmentFound,
    ) -> AppResult<FoundedDepartment> {
        let (write, founded) = ctx.run(async {
            let name = validate_name(&payload.name)?;
            let manager_name =
                validate_required_text(&payload.manager.name, "manager.name", MAX_NAME_LEN)?;
            let national_id = validate_national_id(&payload.manager.national_id)?;
            let secondary_id = validate_secondary_id(payload.manager.secondary_id.as_deref())?;

            let (gate, mut tx) = self.begin_write().await?;
            ensure_identity_free(&mut *tx, Some(&national_id), secondary_id.as_deref(), None)
                .await?;
            if let Some(parent_id) = payload.parent_id
                && department_repo::find_by_id(&mut *tx, parent_id).await?.is_none()
            {
                return Err(parent_not_found(parent_id));
            }

            let now = now_millis();
            let department_id = snowflake_id();
            let manager = Employee {
                id: snowflake_id(),
                name: manager_name,
                national_id,
                secondary_id,
                department_id,
                created_at: now,
                updated_at: now,
            };
            let department = Department {
                id: department_id,
                name,
                manager_id: manager.id,
                parent_id: payload.parent_id,
                created_at: now,
                updated_at: now,
            };
            department_repo::insert(&mut *tx, &department).await?;
            employee_repo::insert(&mut *tx, &manager).await?;
            Ok((
                (gate, tx),
                FoundedDepartment {
                    department,
                    manager,
                },
            ))
        })
        .await?;
        self.commit(ctx, write, Stale::All).await?;

        audit_log!("create", "department", founded.department.id, "with new manager");
        tracing::info!(
            department_id = founded.department.id,
            manager_id = founded.manager.id,
            "Department founded"
        );
        Ok(founded)
    }

    /// Rename, change manager or reparent.
    ///
    /// A new manager from outside the department is moved into it unless
    /// `reassign_manager_on_update` is off. Reparenting is refused when the
    /// new parent sits inside this department's own sub-tree.
    pub async fn update_department(
        &self,
        ctx: &RequestContext,
        id: i64,
        payload: DepartmentUpdate,
    ) -> AppResult<Department> {
        let (write, department) = ctx.run(async {
            let name = payload.name.as_deref().map(validate_name).transpose()?;

            let (gate, mut tx) = self.begin_write().await?;
            let mut department = department_repo::find_by_id(&mut *tx, id)
                .await?
                .ok_or_else(|| department_not_found(id))?;
            let now = now_millis();

            if let Some(manager_id) = payload.manager_id
                && manager_id != department.manager_id
            {
                let manager = employee_repo::find_by_id(&mut *tx, manager_id)
                    .await?
                    .ok_or_else(|| manager_not_found(manager_id))?;
                if let Some(managed) = department_repo::find_by_manager_id(&mut *tx, manager_id).await? {
                    return Err(employee_is_manager(manager_id, managed.id));
                }
                if manager.department_id != id {
                    if !self.options.reassign_manager_on_update {
                        return Err(AppError::with_message(
                            ErrorCode::ManagerNotInDepartment,
                            "Manager must belong to the department",
                        )
                        .with_detail("field", "manager_id")
                        .with_detail("manager_id", manager_id));
                    }
                    employee_repo::set_department(&mut *tx, manager_id, id, now).await?;
                    tracing::debug!(
                        department_id = id,
                        manager_id,
                        from = manager.department_id,
                        "Moved new manager into department"
                    );
                }
                department.manager_id = manager_id;
            }

            match payload.parent_id {
                Some(Some(parent_id)) if department.parent_id != Some(parent_id) => {
                    if department_repo::find_by_id(&mut *tx, parent_id).await?.is_none() {
                        return Err(parent_not_found(parent_id));
                    }
                    let mut hierarchy = Hierarchy::new(SqlGraph::new(&mut *tx));
                    if hierarchy.would_create_cycle(id, parent_id).await? {
                        return Err(AppError::with_message(
                            ErrorCode::HierarchyCycle,
                            "Reparenting would create a cycle",
                        )
                        .with_detail("department_id", id)
                        .with_detail("parent_id", parent_id));
                    }
                    department.parent_id = Some(parent_id);
                }
                Some(None) => department.parent_id = None,
                _ => {}
            }

            if let Some(name) = name {
                department.name = name;
            }
            department.updated_at = now;

            department_repo::update(&mut *tx, &department).await?;
            Ok(((gate, tx), department))
        })
        .await?;
        self.commit(ctx, write, Stale::All).await?;

        audit_log!("update", "department", id);
        tracing::info!(department_id = id, "Department updated");
        Ok(department)
    }

    /// Delete a department that has no sub-departments and no members besides
    /// its manager.
    ///
    /// The manager moves to `reassign_manager_to`, or to the parent when that
    /// is absent. With `remove_manager` the manager is deleted instead.
    pub async fn delete_department(
        &self,
        ctx: &RequestContext,
        id: i64,
        options: DepartmentDelete,
    ) -> AppResult<()> {
        let (write, manager_id) = ctx.run(async {
            if options.remove_manager && options.reassign_manager_to.is_some() {
                return Err(AppError::invalid_request(
                    "remove_manager and reassign_manager_to are mutually exclusive",
                ));
            }
            if options.reassign_manager_to == Some(id) {
                return Err(AppError::invalid_request(
                    "Cannot move the manager into the department being deleted",
                )
                .with_detail("field", "reassign_manager_to"));
            }

            let (gate, mut tx) = self.begin_write().await?;
            let department = department_repo::find_by_id(&mut *tx, id)
                .await?
                .ok_or_else(|| department_not_found(id))?;

            let children = department_repo::find_children(&mut *tx, id).await?;
            if !children.is_empty() {
                return Err(AppError::with_message(
                    ErrorCode::DepartmentHasChildren,
                    format!("Department has {} sub-departments", children.len()),
                )
                .with_detail("department_id", id)
                .with_detail("children", children));
            }
            let members =
                employee_repo::count_in_department(&mut *tx, id, Some(department.manager_id))
                    .await?;
            if members > 0 {
                return Err(AppError::with_message(
                    ErrorCode::DepartmentHasMembers,
                    format!("Department still has {members} members"),
                )
                .with_detail("department_id", id)
                .with_detail("members", members));
            }

            let manager_id = department.manager_id;
            // None: the manager is deleted with the department
            let destination = if options.remove_manager {
                None
            } else {
                let Some(target) = options.reassign_manager_to.or(department.parent_id) else {
                    return Err(AppError::with_message(
                        ErrorCode::ManagerReassignmentRequired,
                        "Root department manager needs a destination",
                    )
                    .with_detail("manager_id", manager_id));
                };
                if department_repo::find_by_id(&mut *tx, target).await?.is_none() {
                    return Err(department_not_found(target));
                }
                Some(target)
            };

            department_repo::delete(&mut *tx, id).await?;
            match destination {
                Some(target) => {
                    employee_repo::set_department(&mut *tx, manager_id, target, now_millis())
                        .await?;
                }
                None => {
                    employee_repo::delete(&mut *tx, manager_id).await?;
                }
            }
            Ok(((gate, tx), manager_id))
        })
        .await?;
        self.commit(ctx, write, Stale::All).await?;

        audit_log!("delete", "department", id);
        tracing::info!(
            department_id = id,
            manager_id,
            manager_removed = options.remove_manager,
            "Department deleted"
        );
        Ok(())
    }

    /// Department with its manager and nested sub-departments
    pub async fn get_department(&self, ctx: &RequestContext, id: i64) -> AppResult<DepartmentTree> {
        ctx.run(async {
            let key = CacheKey::Department(id);
            if let Some(hit) = self.cache.get::<DepartmentTree>(&key) {
                return Ok(hit);
            }
            let generation = self.cache.generation();

            let mut tx = self.begin_read().await?;
            let ids: Vec<i64> = Hierarchy::new(SqlGraph::new(&mut *tx))
                .resolve_subtree(id)
                .await?
                .into_iter()
                .collect();
            let rows = department_repo::find_by_ids(&mut *tx, &ids).await?;
            let tree = assemble_tree(id, rows).ok_or_else(|| department_not_found(id))?;

            self.cache.put(key, &tree, generation);
            Ok(tree)
        })
        .await
    }

    /// Ancestors from the direct parent up to the root
    pub async fn get_ancestors(&self, ctx: &RequestContext, id: i64) -> AppResult<Vec<Department>> {
        ctx.run(async {
            let mut tx = self.begin_read().await?;
            let chain = Hierarchy::new(SqlGraph::new(&mut *tx))
                .resolve_ancestors(id)
                .await?;
            let mut ancestors = Vec::with_capacity(chain.len());
            for ancestor_id in chain {
                let department = department_repo::find_by_id(&mut *tx, ancestor_id)
                    .await?
                    .ok_or_else(|| department_not_found(ancestor_id))?;
                ancestors.push(department);
            }
            Ok(ancestors)
        })
        .await
    }

    /// Ids of the sub-tree rooted at `id`, root included, ascending
    pub async fn list_subdepartment_ids(&self, ctx: &RequestContext, id: i64) -> AppResult<Vec<i64>> {
        ctx.run(async {
            let mut tx = self.begin_read().await?;
            let ids = Hierarchy::new(SqlGraph::new(&mut *tx))
                .resolve_subtree(id)
                .await?;
            Ok(ids.into_iter().collect())
        })
        .await
    }

    pub async fn list_departments(
        &self,
        ctx: &RequestContext,
        query: DepartmentQuery,
    ) -> AppResult<PaginatedResponse<DepartmentWithManager>> {
        ctx.run(async {
            let page = PageRequest::new(query.page, query.page_size);
            let trimmed = |v: Option<String>| {
                v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
            };
            let filter = DepartmentFilter {
                name: trimmed(query.name),
                manager_name: trimmed(query.manager_name),
                parent_id: query.parent_id,
            };

            let mut conn = self.read().await?;
            let (rows, total) =
                department_repo::list(&mut *conn, &filter, query.sort, page.limit(), page.offset())
                    .await?;
            Ok(PaginatedResponse::from_request(rows, total, &page))
        })
        .await
    }
}
