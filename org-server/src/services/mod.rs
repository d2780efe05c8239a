//! Consistency service
//!
//! [`OrgService`] is the only writer of the entity store. Each mutation holds
//! the write gate for its whole check-then-act sequence and runs inside one
//! SQLite transaction; reads go straight to the pool and through the
//! [`EntityCache`].

pub mod cache;
mod department;
mod employee;

pub use cache::{CacheKey, EntityCache};

use std::sync::Arc;
use std::time::Duration;

use sqlx::pool::PoolConnection;
use sqlx::{Sqlite, SqlitePool, Transaction};
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::core::RequestContext;
use crate::db::repository::RepoError;
use crate::utils::{AppError, AppResult, ErrorCode};

/// Behaviour switches
#[derive(Debug, Clone, Copy)]
pub struct ServiceOptions {
    /// Move a new manager into the department on update instead of
    /// rejecting one who is not already a member
    pub reassign_manager_on_update: bool,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self {
            reassign_manager_on_update: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OrgService {
    pool: SqlitePool,
    write_gate: Arc<Mutex<()>>,
    cache: Arc<EntityCache>,
    options: ServiceOptions,
}

/// Open write: the gate guard plus its transaction
type WriteTx = (OwnedMutexGuard<()>, Transaction<'static, Sqlite>);

/// Cache entries a committed write makes stale
#[derive(Debug)]
enum Stale {
    Nothing,
    Key(CacheKey),
    All,
}

impl OrgService {
    pub fn new(pool: SqlitePool, cache: EntityCache, options: ServiceOptions) -> Self {
        Self {
            pool,
            write_gate: Arc::new(Mutex::new(())),
            cache: Arc::new(cache),
            options,
        }
    }

    /// Service with default options and a small cache
    pub fn with_pool(pool: SqlitePool) -> Self {
        Self::new(
            pool,
            EntityCache::new(256, Duration::from_secs(60)),
            ServiceOptions::default(),
        )
    }

    pub fn cache(&self) -> &EntityCache {
        &self.cache
    }

    pub fn options(&self) -> ServiceOptions {
        self.options
    }

    async fn begin_write(&self) -> AppResult<WriteTx> {
        let gate = Arc::clone(&self.write_gate).lock_owned().await;
        let tx = self.pool.begin().await.map_err(RepoError::from)?;
        Ok((gate, tx))
    }

    /// Commit `write` and drop the cache entries it made stale.
    ///
    /// Cancellation and the deadline are checked once, before the commit.
    /// The commit and the invalidation then run on their own task under the
    /// write gate, so dropping the caller cannot leave committed rows behind
    /// a stale cache entry. Deferred foreign keys are checked at commit, so a
    /// violation surfaces as `reference_conflict`.
    async fn commit(&self, ctx: &RequestContext, write: WriteTx, stale: Stale) -> AppResult<()> {
        ctx.check()?;
        let (gate, tx) = write;
        let cache = Arc::clone(&self.cache);
        let committed = tokio::spawn(async move {
            let result = tx.commit().await;
            if result.is_ok() {
                match &stale {
                    Stale::Nothing => {}
                    Stale::Key(key) => cache.invalidate(key),
                    Stale::All => cache.clear(),
                }
            }
            drop(gate);
            result
        })
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Commit task failed");
            AppError::new(ErrorCode::InternalError)
        })?;
        committed.map_err(RepoError::from)?;
        Ok(())
    }

    /// One snapshot for reads that span several queries; dropped, never committed
    async fn begin_read(&self) -> AppResult<Transaction<'static, Sqlite>> {
        Ok(self.pool.begin().await.map_err(RepoError::from)?)
    }

    async fn read(&self) -> AppResult<PoolConnection<Sqlite>> {
        Ok(self.pool.acquire().await.map_err(RepoError::from)?)
    }
}

pub(crate) fn employee_not_found(id: i64) -> AppError {
    AppError::with_message(ErrorCode::EmployeeNotFound, format!("Employee {id} not found"))
        .with_detail("employee_id", id)
}

pub(crate) fn department_not_found(id: i64) -> AppError {
    AppError::with_message(
        ErrorCode::DepartmentNotFound,
        format!("Department {id} not found"),
    )
    .with_detail("department_id", id)
}

/// The employee already manages `department_id`
pub(crate) fn employee_is_manager(employee_id: i64, department_id: i64) -> AppError {
    AppError::with_message(
        ErrorCode::EmployeeIsManager,
        format!("Employee {employee_id} manages department {department_id}"),
    )
    .with_detail("employee_id", employee_id)
    .with_detail("department_id", department_id)
}
