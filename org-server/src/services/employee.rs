//! Employee operations

use shared::models::{Employee, EmployeeCreate, EmployeeDetail, EmployeeQuery, EmployeeUpdate};
use shared::pagination::{PageRequest, PaginatedResponse};
use shared::util::{now_millis, snowflake_id};
use shared::validation::{clean_secondary_id, national_id_digits};
use sqlx::SqliteConnection;

use super::{OrgService, Stale, department_not_found, employee_is_manager, employee_not_found};
use crate::audit_log;
use crate::core::RequestContext;
use crate::db::repository::department as department_repo;
use crate::db::repository::employee::{self as employee_repo, EmployeeFilter};
use crate::hierarchy::{Hierarchy, SqlGraph};
use crate::services::CacheKey;
use crate::utils::validation::{validate_name, validate_national_id, validate_secondary_id};
use crate::utils::{AppError, AppResult, ErrorCode};

/// Fail with a field-level conflict if either identifier belongs to another employee
pub(super) async fn ensure_identity_free(
    conn: &mut SqliteConnection,
    national_id: Option<&str>,
    secondary_id: Option<&str>,
    exclude_id: Option<i64>,
) -> AppResult<()> {
    if let Some(national_id) = national_id
        && employee_repo::exists_by_national_id(conn, national_id, exclude_id).await?
    {
        return Err(AppError::conflict(
            ErrorCode::NationalIdExists,
            "National ID is already registered",
        )
        .with_detail("field", "national_id"));
    }
    if let Some(secondary_id) = secondary_id
        && employee_repo::exists_by_secondary_id(conn, secondary_id, exclude_id).await?
    {
        return Err(AppError::conflict(
            ErrorCode::SecondaryIdExists,
            "Secondary ID is already registered",
        )
        .with_detail("field", "secondary_id"));
    }
    Ok(())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl OrgService {
    pub async fn create_employee(
        &self,
        ctx: &RequestContext,
        payload: EmployeeCreate,
    ) -> AppResult<Employee> {
        let (write, employee) = ctx.run(async {
            let name = validate_name(&payload.name)?;
            let national_id = validate_national_id(&payload.national_id)?;
            let secondary_id = validate_secondary_id(payload.secondary_id.as_deref())?;

            let (gate, mut tx) = self.begin_write().await?;
            ensure_identity_free(&mut *tx, Some(&national_id), secondary_id.as_deref(), None)
                .await?;
            if department_repo::find_by_id(&mut *tx, payload.department_id)
                .await?
                .is_none()
            {
                return Err(department_not_found(payload.department_id));
            }

            let now = now_millis();
            let employee = Employee {
                id: snowflake_id(),
                name,
                national_id,
                secondary_id,
                department_id: payload.department_id,
                created_at: now,
                updated_at: now,
            };
            employee_repo::insert(&mut *tx, &employee).await?;
            Ok(((gate, tx), employee))
        })
        .await?;
        self.commit(ctx, write, Stale::Nothing).await?;

        audit_log!("create", "employee", employee.id);
        tracing::info!(
            employee_id = employee.id,
            department_id = employee.department_id,
            "Employee created"
        );
        Ok(employee)
    }

    /// Merge the provided fields into the stored employee.
    ///
    /// An employee who manages a department cannot change department.
    pub async fn update_employee(
        &self,
        ctx: &RequestContext,
        id: i64,
        payload: EmployeeUpdate,
    ) -> AppResult<Employee> {
        let (write, employee, managed) = ctx.run(async {
            let name = payload.name.as_deref().map(validate_name).transpose()?;
            let national_id = payload
                .national_id
                .as_deref()
                .map(validate_national_id)
                .transpose()?;
            // Some(None) clears the secondary ID
            let secondary_id = match payload.secondary_id.as_deref() {
                Some(raw) => Some(validate_secondary_id(Some(raw))?),
                None => None,
            };

            let (gate, mut tx) = self.begin_write().await?;
            let mut employee = employee_repo::find_by_id(&mut *tx, id)
                .await?
                .ok_or_else(|| employee_not_found(id))?;
            let managed = department_repo::find_by_manager_id(&mut *tx, id).await?;

            ensure_identity_free(
                &mut *tx,
                national_id.as_deref(),
                secondary_id.as_ref().and_then(|s| s.as_deref()),
                Some(id),
            )
            .await?;

            if let Some(department_id) = payload.department_id
                && department_id != employee.department_id
            {
                if department_repo::find_by_id(&mut *tx, department_id)
                    .await?
                    .is_none()
                {
                    return Err(department_not_found(department_id));
                }
                if let Some(managed) = &managed {
                    return Err(employee_is_manager(id, managed.id));
                }
                employee.department_id = department_id;
            }
            if let Some(name) = name {
                employee.name = name;
            }
            if let Some(national_id) = national_id {
                employee.national_id = national_id;
            }
            if let Some(secondary_id) = secondary_id {
                employee.secondary_id = secondary_id;
            }
            employee.updated_at = now_millis();

            employee_repo::update(&mut *tx, &employee).await?;
            Ok(((gate, tx), employee, managed.is_some()))
        })
        .await?;
        // A manager's name shows up in other employees' details and in trees
        let stale = if managed {
            Stale::All
        } else {
            Stale::Key(CacheKey::Employee(id))
        };
        self.commit(ctx, write, stale).await?;

        audit_log!("update", "employee", id);
        tracing::info!(employee_id = id, "Employee updated");
        Ok(employee)
    }

    /// Delete an employee who manages no department
    pub async fn delete_employee(&self, ctx: &RequestContext, id: i64) -> AppResult<()> {
        let write = ctx.run(async {
            let (gate, mut tx) = self.begin_write().await?;
            if employee_repo::find_by_id(&mut *tx, id).await?.is_none() {
                return Err(employee_not_found(id));
            }
            if let Some(managed) = department_repo::find_by_manager_id(&mut *tx, id).await? {
                return Err(employee_is_manager(id, managed.id));
            }
            employee_repo::delete(&mut *tx, id).await?;
            Ok((gate, tx))
        })
        .await?;
        self.commit(ctx, write, Stale::Key(CacheKey::Employee(id)))
            .await?;

        audit_log!("delete", "employee", id);
        tracing::info!(employee_id = id, "Employee deleted");
        Ok(())
    }

    /// Employee with its department and that department's manager
    pub async fn get_employee(&self, ctx: &RequestContext, id: i64) -> AppResult<EmployeeDetail> {
        ctx.run(async {
            let key = CacheKey::Employee(id);
            if let Some(hit) = self.cache.get::<EmployeeDetail>(&key) {
                return Ok(hit);
            }
            let generation = self.cache.generation();
            let mut conn = self.read().await?;
            let detail = employee_repo::find_detail(&mut *conn, id)
                .await?
                .ok_or_else(|| employee_not_found(id))?;
            self.cache.put(key, &detail, generation);
            Ok(detail)
        })
        .await
    }

    pub async fn list_employees(
        &self,
        ctx: &RequestContext,
        query: EmployeeQuery,
    ) -> AppResult<PaginatedResponse<Employee>> {
        ctx.run(async {
            let page = PageRequest::new(query.page, query.page_size);
            let filter = EmployeeFilter {
                name: non_blank(query.name).map(|n| n.trim().to_string()),
                national_id: non_blank(query.national_id).map(|v| national_id_digits(&v)),
                secondary_id: non_blank(query.secondary_id).map(|v| clean_secondary_id(&v)),
                department_id: query.department_id,
            };

            let mut conn = self.read().await?;
            let (rows, total) =
                employee_repo::list(&mut *conn, &filter, query.sort, page.limit(), page.offset())
                    .await?;
            Ok(PaginatedResponse::from_request(rows, total, &page))
        })
        .await
    }

    /// Employees of the department `manager_id` manages and of all departments below it
    pub async fn subordinates(&self, ctx: &RequestContext, manager_id: i64) -> AppResult<Vec<Employee>> {
        ctx.run(async {
            let mut tx = self.begin_read().await?;
            let mut hierarchy = Hierarchy::new(SqlGraph::new(&mut *tx));
            let employees = hierarchy.subordinate_employees(manager_id).await?;
            tracing::debug!(manager_id, count = employees.len(), "Resolved subordinates");
            Ok(employees)
        })
        .await
    }
}
