//! Department Repository

use super::{RepoError, RepoResult, json_id_array};
use shared::models::{Department, DepartmentWithManager, SortKey};
use shared::util::name_key;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

const DEPARTMENT_SELECT: &str =
    "SELECT id, name, manager_id, parent_id, created_at, updated_at FROM department";

const DEPARTMENT_WITH_MANAGER_SELECT: &str = "SELECT d.id, d.name, d.manager_id, m.name AS manager_name, d.parent_id, d.created_at, d.updated_at FROM department d JOIN employee m ON d.manager_id = m.id";

/// Normalised list filter; every set field must match
#[derive(Debug, Clone, Default)]
pub struct DepartmentFilter {
    /// Case-insensitive substring of the department name
    pub name: Option<String>,
    /// Case-insensitive substring of the manager's name
    pub manager_name: Option<String>,
    pub parent_id: Option<i64>,
}

pub async fn find_by_id(conn: &mut SqliteConnection, id: i64) -> RepoResult<Option<Department>> {
    let sql = format!("{DEPARTMENT_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, Department>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(row)
}

pub async fn insert(conn: &mut SqliteConnection, department: &Department) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO department (id, name, name_key, manager_id, parent_id, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )
    .bind(department.id)
    .bind(&department.name)
    .bind(name_key(&department.name))
    .bind(department.manager_id)
    .bind(department.parent_id)
    .bind(department.created_at)
    .bind(department.updated_at)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Replace every mutable column of an existing row.
///
/// When the parent changes the new ancestor chain is re-walked in the same
/// transaction, so a cycle that slipped past the service check still aborts.
pub async fn update(conn: &mut SqliteConnection, department: &Department) -> RepoResult<()> {
    let previous_parent: Option<Option<i64>> =
        sqlx::query_scalar("SELECT parent_id FROM department WHERE id = ?")
            .bind(department.id)
            .fetch_optional(&mut *conn)
            .await?;
    let Some(previous_parent) = previous_parent else {
        return Err(RepoError::NotFound(format!(
            "Department {} not found",
            department.id
        )));
    };

    sqlx::query(
        "UPDATE department SET name = ?1, name_key = ?2, manager_id = ?3, parent_id = ?4, updated_at = ?5 WHERE id = ?6",
    )
    .bind(&department.name)
    .bind(name_key(&department.name))
    .bind(department.manager_id)
    .bind(department.parent_id)
    .bind(department.updated_at)
    .bind(department.id)
    .execute(&mut *conn)
    .await?;

    if department.parent_id.is_some() && department.parent_id != previous_parent {
        ensure_acyclic(conn, department.id).await?;
    }
    Ok(())
}

/// Fail with [`RepoError::Cycle`] if `id` is its own ancestor.
///
/// The walk is capped at the department count, so a corrupted table cannot
/// make the recursive query run forever.
pub async fn ensure_acyclic(conn: &mut SqliteConnection, id: i64) -> RepoResult<()> {
    let bound = count(conn).await? as i64;
    let hits: i64 = sqlx::query_scalar(
        r#"
        WITH RECURSIVE chain(id, depth) AS (
            SELECT parent_id, 1 FROM department WHERE id = ?1
            UNION ALL
            SELECT d.parent_id, c.depth + 1
            FROM department d JOIN chain c ON d.id = c.id
            WHERE c.depth <= ?2
        )
        SELECT COUNT(*) FROM chain WHERE id = ?1
        "#,
    )
    .bind(id)
    .bind(bound)
    .fetch_one(&mut *conn)
    .await?;
    if hits > 0 {
        return Err(RepoError::Cycle(Some(id)));
    }
    Ok(())
}

pub async fn delete(conn: &mut SqliteConnection, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM department WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(rows.rows_affected() > 0)
}

/// Department managed by `manager_id`, if any
pub async fn find_by_manager_id(
    conn: &mut SqliteConnection,
    manager_id: i64,
) -> RepoResult<Option<Department>> {
    let sql = format!("{DEPARTMENT_SELECT} WHERE manager_id = ?");
    let row = sqlx::query_as::<_, Department>(&sql)
        .bind(manager_id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(row)
}

/// `Some(parent)` if the department exists, `None` otherwise
pub async fn parent_of(conn: &mut SqliteConnection, id: i64) -> RepoResult<Option<Option<i64>>> {
    let row: Option<Option<i64>> =
        sqlx::query_scalar("SELECT parent_id FROM department WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
    Ok(row)
}

/// Ids of the direct sub-departments
pub async fn find_children(conn: &mut SqliteConnection, parent_id: i64) -> RepoResult<Vec<i64>> {
    let rows: Vec<i64> =
        sqlx::query_scalar("SELECT id FROM department WHERE parent_id = ? ORDER BY name_key, id")
            .bind(parent_id)
            .fetch_all(&mut *conn)
            .await?;
    Ok(rows)
}

pub async fn count(conn: &mut SqliteConnection) -> RepoResult<u64> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM department")
        .fetch_one(&mut *conn)
        .await?;
    Ok(total.max(0) as u64)
}

/// Departments with manager names for the given ids, in no particular order
pub async fn find_by_ids(
    conn: &mut SqliteConnection,
    ids: &[i64],
) -> RepoResult<Vec<DepartmentWithManager>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let sql = format!("{DEPARTMENT_WITH_MANAGER_SELECT} WHERE d.id IN (SELECT value FROM json_each(?))");
    let rows = sqlx::query_as::<_, DepartmentWithManager>(&sql)
        .bind(json_id_array(ids))
        .fetch_all(&mut *conn)
        .await?;
    Ok(rows)
}

fn push_filter(qb: &mut QueryBuilder<'_, Sqlite>, filter: &DepartmentFilter) {
    let mut sep = " WHERE ";
    if let Some(name) = &filter.name {
        qb.push(sep)
            .push("instr(d.name_key, ")
            .push_bind(name_key(name))
            .push(") > 0");
        sep = " AND ";
    }
    if let Some(manager_name) = &filter.manager_name {
        qb.push(sep)
            .push("instr(m.name_key, ")
            .push_bind(name_key(manager_name))
            .push(") > 0");
        sep = " AND ";
    }
    if let Some(parent_id) = filter.parent_id {
        qb.push(sep).push("d.parent_id = ").push_bind(parent_id);
    }
}

/// One page of departments plus the total number of matches
pub async fn list(
    conn: &mut SqliteConnection,
    filter: &DepartmentFilter,
    sort: SortKey,
    limit: i64,
    offset: i64,
) -> RepoResult<(Vec<DepartmentWithManager>, u64)> {
    let mut count_qb: QueryBuilder<Sqlite> = QueryBuilder::new(
        "SELECT COUNT(*) FROM department d JOIN employee m ON d.manager_id = m.id",
    );
    push_filter(&mut count_qb, filter);
    let total: i64 = count_qb
        .build_query_scalar()
        .fetch_one(&mut *conn)
        .await?;

    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(DEPARTMENT_WITH_MANAGER_SELECT);
    push_filter(&mut qb, filter);
    qb.push(match sort {
        SortKey::Name => " ORDER BY d.name_key ASC, d.id ASC",
        SortKey::CreatedAt => " ORDER BY d.created_at ASC, d.id ASC",
    });
    qb.push(" LIMIT ").push_bind(limit);
    qb.push(" OFFSET ").push_bind(offset);
    let rows = qb
        .build_query_as::<DepartmentWithManager>()
        .fetch_all(&mut *conn)
        .await?;

    Ok((rows, total.max(0) as u64))
}
