//! Org Server - employee and department hierarchy service
//!
//! # Architecture
//!
//! - **Entity store** (`db`): SQLite via sqlx, one free function per query
//! - **Hierarchy engine** (`hierarchy`): sub-tree, ancestor and cycle checks
//!   over a read-only graph interface
//! - **Consistency service** (`services`): every create/update/delete, run
//!   transactionally behind a write gate, plus a read cache
//! - **HTTP API** (`api`): thin axum handlers
//!
//! ```text
//! org-server/src/
//! ├── core/          # config, state, request context, server
//! ├── db/            # pool, migrations, repositories
//! ├── hierarchy/     # tree engine
//! ├── services/      # OrgService, EntityCache
//! ├── api/           # routes and handlers
//! └── utils/         # logging, input validation
//! ```

pub mod api;
pub mod core;
pub mod db;
pub mod hierarchy;
pub mod services;
pub mod utils;

pub use core::{Config, RequestContext, Server, ServerState};
pub use services::{OrgService, ServiceOptions};
pub use utils::{ApiResponse, AppError, AppResult, ErrorCode};

pub use utils::logger::{cleanup_old_logs, init_logger_with_file};

/// Load `.env`, read the configuration and start logging
pub fn setup_environment() -> anyhow::Result<Config> {
    let _ = dotenv::dotenv();
    let config = Config::from_env();
    init_logger_with_file(
        &config.log_level,
        config.is_production(),
        config.log_dir.as_deref(),
    )?;
    Ok(config)
}
