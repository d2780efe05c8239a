//! Server state shared by every handler

use tokio_util::sync::CancellationToken;

use crate::core::{Config, RequestContext, Result, ServerError};
use crate::db::DbService;
use crate::services::{EntityCache, OrgService, ServiceOptions};

/// Server state
///
/// Cheap to clone: every field is a handle.
///
/// # Example
///
/// ```ignore
/// let state = ServerState::initialize(&config).await?;
/// let ctx = state.request_context();
/// let tree = state.org.get_department(&ctx, id).await?;
/// ```
#[derive(Clone, Debug)]
pub struct ServerState {
    pub config: Config,
    pub db: DbService,
    /// Consistency service, the only writer
    pub org: OrgService,
    /// Cancelled on shutdown; every request context is a child of it
    pub shutdown: CancellationToken,
}

impl ServerState {
    pub fn new(config: Config, db: DbService) -> Self {
        let cache = EntityCache::new(config.cache_capacity, config.cache_ttl());
        let options = ServiceOptions {
            reassign_manager_on_update: config.reassign_manager_on_update,
        };
        let org = OrgService::new(db.pool.clone(), cache, options);
        Self {
            config,
            db,
            org,
            shutdown: CancellationToken::new(),
        }
    }

    /// Open the database, apply migrations and build the services
    pub async fn initialize(config: &Config) -> Result<Self> {
        let db = DbService::new(&config.database_url, config.db_max_connections)
            .await
            .map_err(ServerError::Database)?;
        tracing::info!(
            cache_capacity = config.cache_capacity,
            reassign_manager_on_update = config.reassign_manager_on_update,
            "Server state initialized"
        );
        Ok(Self::new(config.clone(), db))
    }

    /// Context for one request: cancelled on shutdown, bounded by the request timeout
    pub fn request_context(&self) -> RequestContext {
        RequestContext::with_token(
            self.shutdown.child_token(),
            Some(self.config.request_timeout()),
        )
    }
}
