//! Shared fixtures for the integration tests
#![allow(dead_code)]

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use org_server::db::DbService;
use org_server::{AppError, ErrorCode, OrgService, RequestContext};
use shared::models::{DepartmentFound, Employee, EmployeeCreate, FoundedDepartment, NewManager};
use shared::validation::complete_national_id;
use tempfile::TempDir;

/// Service over a file-backed database in a temp directory
///
/// The directory lives as long as the value, so keep it bound.
pub struct TestOrg {
    pub org: OrgService,
    pub db: DbService,
    _dir: TempDir,
}

impl std::ops::Deref for TestOrg {
    type Target = OrgService;

    fn deref(&self) -> &OrgService {
        &self.org
    }
}

pub async fn setup() -> TestOrg {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("org.db").display());
    let db = DbService::new(&url, 4).await.unwrap();
    TestOrg {
        org: OrgService::with_pool(db.pool.clone()),
        db,
        _dir: dir,
    }
}

pub fn ctx() -> RequestContext {
    RequestContext::new(Duration::from_secs(10))
}

static NEXT_BASE: AtomicU32 = AtomicU32::new(0);

/// A fresh checksum-valid national ID, unformatted
pub fn national_id() -> String {
    let n = NEXT_BASE.fetch_add(1, Ordering::Relaxed);
    complete_national_id(&format!("{:09}", 100_000_001 + n * 37)).unwrap()
}

/// `52998224725` -> `529.982.247-25`
pub fn formatted(national_id: &str) -> String {
    format!(
        "{}.{}.{}-{}",
        &national_id[0..3],
        &national_id[3..6],
        &national_id[6..9],
        &national_id[9..11]
    )
}

pub async fn found(org: &OrgService, name: &str, parent_id: Option<i64>) -> FoundedDepartment {
    org.found_department(
        &ctx(),
        DepartmentFound {
            name: name.to_string(),
            parent_id,
            manager: NewManager {
                name: format!("{name} Manager"),
                national_id: national_id(),
                secondary_id: None,
            },
        },
    )
    .await
    .unwrap()
}

pub async fn hire(org: &OrgService, name: &str, department_id: i64) -> Employee {
    org.create_employee(&ctx(), new_employee(name, department_id))
        .await
        .unwrap()
}

pub fn new_employee(name: &str, department_id: i64) -> EmployeeCreate {
    EmployeeCreate {
        name: name.to_string(),
        national_id: national_id(),
        secondary_id: None,
        department_id,
    }
}

pub fn field(err: &AppError) -> Option<&str> {
    err.details.as_ref()?.get("field")?.as_str()
}

#[track_caller]
pub fn assert_code<T: std::fmt::Debug>(result: Result<T, AppError>, code: ErrorCode) -> AppError {
    match result {
        Ok(v) => panic!("expected {code:?}, got Ok({v:?})"),
        Err(e) => {
            assert_eq!(e.code, code, "unexpected error: {e:?}");
            e
        }
    }
}
