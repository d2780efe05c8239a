use std::time::Duration;

/// Server configuration
///
/// # Environment variables
///
/// Every field can be overridden from the environment (`.env` is loaded first):
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | DATABASE_URL | sqlite:org.db | SQLite file or `sqlite::memory:` |
/// | HTTP_PORT | 3000 | HTTP listen port |
/// | ENVIRONMENT | development | development / staging / production |
/// | LOG_LEVEL | info | default tracing level (`RUST_LOG` wins) |
/// | LOG_DIR | unset | enables the daily rolling log file |
/// | REQUEST_TIMEOUT_MS | 30000 | per-request deadline |
/// | DB_MAX_CONNECTIONS | 5 | pool size |
/// | CACHE_CAPACITY | 1024 | cached detail responses, 0 disables |
/// | CACHE_TTL_SECS | 300 | cache entry lifetime |
/// | REASSIGN_MANAGER_ON_UPDATE | true | pull a new manager into the department |
///
/// # Example
///
/// ```ignore
/// DATABASE_URL=sqlite:/data/org.db HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub http_port: u16,
    /// development | staging | production
    pub environment: String,
    pub log_level: String,
    pub log_dir: Option<String>,
    pub request_timeout_ms: u64,
    pub db_max_connections: u32,
    pub cache_capacity: usize,
    pub cache_ttl_secs: u64,
    /// When false, a new manager must already belong to the department
    pub reassign_manager_on_update: bool,
}

impl Config {
    /// Load configuration from the environment
    ///
    /// Unset or unparsable variables fall back to their defaults
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:org.db".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok().filter(|d| !d.is_empty()),
            request_timeout_ms: std::env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(30000),
            db_max_connections: std::env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5),
            cache_capacity: std::env::var("CACHE_CAPACITY")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(1024),
            cache_ttl_secs: std::env::var("CACHE_TTL_SECS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(300),
            reassign_manager_on_update: std::env::var("REASSIGN_MANAGER_ON_UPDATE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }

    /// In-memory database, small cache, no file logging
    pub fn for_tests() -> Self {
        Self {
            database_url: "sqlite::memory:".into(),
            http_port: 0,
            environment: "test".into(),
            log_level: "debug".into(),
            log_dir: None,
            request_timeout_ms: 5000,
            db_max_connections: 1,
            cache_capacity: 64,
            cache_ttl_secs: 60,
            reassign_manager_on_update: true,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
