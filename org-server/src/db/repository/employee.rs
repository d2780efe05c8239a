//! Employee Repository

use super::{RepoError, RepoResult, json_id_array};
use shared::models::{Employee, EmployeeDetail, SortKey};
use shared::util::name_key;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

const EMPLOYEE_SELECT: &str = "SELECT id, name, national_id, secondary_id, department_id, created_at, updated_at FROM employee";

const EMPLOYEE_DETAIL_SELECT: &str = "SELECT e.id, e.name, e.national_id, e.secondary_id, e.department_id, d.name AS department_name, d.manager_id, m.name AS manager_name, e.created_at, e.updated_at FROM employee e JOIN department d ON e.department_id = d.id JOIN employee m ON d.manager_id = m.id";

/// Normalised list filter; every set field must match
#[derive(Debug, Clone, Default)]
pub struct EmployeeFilter {
    /// Case-insensitive substring
    pub name: Option<String>,
    pub national_id: Option<String>,
    pub secondary_id: Option<String>,
    pub department_id: Option<i64>,
}

pub async fn find_by_id(conn: &mut SqliteConnection, id: i64) -> RepoResult<Option<Employee>> {
    let sql = format!("{EMPLOYEE_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, Employee>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(row)
}

pub async fn find_detail(
    conn: &mut SqliteConnection,
    id: i64,
) -> RepoResult<Option<EmployeeDetail>> {
    let sql = format!("{EMPLOYEE_DETAIL_SELECT} WHERE e.id = ?");
    let row = sqlx::query_as::<_, EmployeeDetail>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(row)
}

pub async fn insert(conn: &mut SqliteConnection, employee: &Employee) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO employee (id, name, name_key, national_id, secondary_id, department_id, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
    )
    .bind(employee.id)
    .bind(&employee.name)
    .bind(name_key(&employee.name))
    .bind(&employee.national_id)
    .bind(&employee.secondary_id)
    .bind(employee.department_id)
    .bind(employee.created_at)
    .bind(employee.updated_at)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Replace every mutable column of an existing row
pub async fn update(conn: &mut SqliteConnection, employee: &Employee) -> RepoResult<()> {
    let rows = sqlx::query(
        "UPDATE employee SET name = ?1, name_key = ?2, national_id = ?3, secondary_id = ?4, department_id = ?5, updated_at = ?6 WHERE id = ?7",
    )
    .bind(&employee.name)
    .bind(name_key(&employee.name))
    .bind(&employee.national_id)
    .bind(&employee.secondary_id)
    .bind(employee.department_id)
    .bind(employee.updated_at)
    .bind(employee.id)
    .execute(&mut *conn)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Employee {} not found", employee.id)));
    }
    Ok(())
}

/// Move an employee to another department
pub async fn set_department(
    conn: &mut SqliteConnection,
    id: i64,
    department_id: i64,
    now: i64,
) -> RepoResult<()> {
    let rows = sqlx::query("UPDATE employee SET department_id = ?1, updated_at = ?2 WHERE id = ?3")
        .bind(department_id)
        .bind(now)
        .bind(id)
        .execute(&mut *conn)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Employee {id} not found")));
    }
    Ok(())
}

pub async fn delete(conn: &mut SqliteConnection, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM employee WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(rows.rows_affected() > 0)
}

/// Whether another employee already holds `national_id`
pub async fn exists_by_national_id(
    conn: &mut SqliteConnection,
    national_id: &str,
    exclude_id: Option<i64>,
) -> RepoResult<bool> {
    let found: Option<i64> =
        sqlx::query_scalar("SELECT id FROM employee WHERE national_id = ?1 AND id IS NOT ?2 LIMIT 1")
            .bind(national_id)
            .bind(exclude_id)
            .fetch_optional(&mut *conn)
            .await?;
    Ok(found.is_some())
}

/// Whether another employee already holds `secondary_id`
pub async fn exists_by_secondary_id(
    conn: &mut SqliteConnection,
    secondary_id: &str,
    exclude_id: Option<i64>,
) -> RepoResult<bool> {
    let found: Option<i64> =
        sqlx::query_scalar("SELECT id FROM employee WHERE secondary_id = ?1 AND id IS NOT ?2 LIMIT 1")
            .bind(secondary_id)
            .bind(exclude_id)
            .fetch_optional(&mut *conn)
            .await?;
    Ok(found.is_some())
}

/// Department of an employee, `None` if the employee does not exist
pub async fn department_of(conn: &mut SqliteConnection, id: i64) -> RepoResult<Option<i64>> {
    let row: Option<i64> = sqlx::query_scalar("SELECT department_id FROM employee WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(row)
}

/// All employees of the given departments, ordered by name
pub async fn find_by_department_ids(
    conn: &mut SqliteConnection,
    department_ids: &[i64],
) -> RepoResult<Vec<Employee>> {
    if department_ids.is_empty() {
        return Ok(Vec::new());
    }
    let sql = format!(
        "{EMPLOYEE_SELECT} WHERE department_id IN (SELECT value FROM json_each(?)) ORDER BY name_key, id"
    );
    let rows = sqlx::query_as::<_, Employee>(&sql)
        .bind(json_id_array(department_ids))
        .fetch_all(&mut *conn)
        .await?;
    Ok(rows)
}

/// Members of a department, optionally leaving one employee out
pub async fn count_in_department(
    conn: &mut SqliteConnection,
    department_id: i64,
    exclude_id: Option<i64>,
) -> RepoResult<i64> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM employee WHERE department_id = ?1 AND id IS NOT ?2",
    )
    .bind(department_id)
    .bind(exclude_id)
    .fetch_one(&mut *conn)
    .await?;
    Ok(count)
}

fn push_filter(qb: &mut QueryBuilder<'_, Sqlite>, filter: &EmployeeFilter) {
    let mut sep = " WHERE ";
    if let Some(name) = &filter.name {
        qb.push(sep)
            .push("instr(name_key, ")
            .push_bind(name_key(name))
            .push(") > 0");
        sep = " AND ";
    }
    if let Some(national_id) = &filter.national_id {
        qb.push(sep).push("national_id = ").push_bind(national_id.clone());
        sep = " AND ";
    }
    if let Some(secondary_id) = &filter.secondary_id {
        qb.push(sep).push("secondary_id = ").push_bind(secondary_id.clone());
        sep = " AND ";
    }
    if let Some(department_id) = filter.department_id {
        qb.push(sep).push("department_id = ").push_bind(department_id);
    }
}

/// One page of employees plus the total number of matches
pub async fn list(
    conn: &mut SqliteConnection,
    filter: &EmployeeFilter,
    sort: SortKey,
    limit: i64,
    offset: i64,
) -> RepoResult<(Vec<Employee>, u64)> {
    let mut count_qb: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT COUNT(*) FROM employee");
    push_filter(&mut count_qb, filter);
    let total: i64 = count_qb
        .build_query_scalar()
        .fetch_one(&mut *conn)
        .await?;

    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(EMPLOYEE_SELECT);
    push_filter(&mut qb, filter);
    qb.push(match sort {
        SortKey::Name => " ORDER BY name_key ASC, id ASC",
        SortKey::CreatedAt => " ORDER BY created_at ASC, id ASC",
    });
    qb.push(" LIMIT ").push_bind(limit);
    qb.push(" OFFSET ").push_bind(offset);
    let rows = qb.build_query_as::<Employee>().fetch_all(&mut *conn).await?;

    Ok((rows, total.max(0) as u64))
}
