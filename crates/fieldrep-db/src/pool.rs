//! # Pool and Database Handle
//!
//! Opens the SQLite file (or a private in-memory database), creates the
//! entity tables and hands out repositories.
//!
//! ## Who holds a connection, and when
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Database::new(DbConfig)                                                │
//! │       │  open pool, CREATE TABLE IF NOT EXISTS for every Entity         │
//! │       ▼                                                                 │
//! │  Database (Clone = same pool)                                           │
//! │       │                                                                 │
//! │       ├── db.contacts()  ─┐                                             │
//! │       ├── db.visits()    ─┼─ each: own Executor + own row cache         │
//! │       └── workers.spawn ─┘                                              │
//! │                    │                                                    │
//! │                    ▼                                                    │
//! │  Executor::execute ── borrows one pooled connection for one statement   │
//! │                       and returns it on commit or rollback              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! File databases use WAL journaling, so readers are not blocked while an
//! import writes.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use fieldrep_core::query::{build, QueryKind, QueryParams};
use fieldrep_core::Entity;

use crate::error::{DbError, DbResult};
use crate::executor::Executor;
use crate::repository::calculator::CalculatorRepository;
use crate::repository::contact::ContactRepository;
use crate::repository::customer::CustomerRepository;
use crate::repository::detail::DetailRepository;
use crate::repository::employee::EmployeeRepository;
use crate::repository::product::ProductRepository;
use crate::repository::report::ReportRepository;
use crate::repository::settings::SettingsRepository;
use crate::repository::visit::VisitRepository;
use crate::repository::Repository;

const MEMORY_PATH: &str = ":memory:";

// =============================================================================
// Configuration
// =============================================================================

/// Where the database lives and how the pool behaves.
///
/// ```rust,ignore
/// let config = DbConfig::new("./data/fieldrep.db").max_connections(5);
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// SQLite file, created on first open. `:memory:` selects a private
    /// in-memory database.
    pub database_path: PathBuf,

    /// Pool ceiling. The default of 5 lets every import kind run at once.
    pub max_connections: u32,

    pub min_connections: u32,

    /// How long to wait for a free connection.
    pub connect_timeout: Duration,

    /// Idle connections above the minimum are closed after this long.
    pub idle_timeout: Duration,

    /// Create missing entity tables on open (default on).
    pub ensure_schema: bool,
}

impl DbConfig {
    /// File database at `path` with default pool sizing.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            ensure_schema: true,
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    /// How long `Database::new` and each statement wait for a connection.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn ensure_schema(mut self, ensure: bool) -> Self {
        self.ensure_schema = ensure;
        self
    }

    /// Private in-memory database, gone when the pool closes. Each call
    /// yields a separate, empty database.
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(MEMORY_PATH),
            max_connections: 1,
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(60),
            ensure_schema: true,
        }
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_path.as_os_str() == MEMORY_PATH
    }
}

// =============================================================================
// Database
// =============================================================================

/// Pool handle and repository factory.
///
/// Cloning shares the pool. Every repository handed out owns its own
/// executor and its own row cache, so two callers never see each other's
/// "current row".
///
/// ## Usage
/// ```rust,ignore
/// let db = Database::new(DbConfig::new("./fieldrep.db")).await?;
/// let mut contacts = db.contacts();
/// let rows = contacts.load_for_customer(7).await?;
/// ```
#[derive(Debug, Clone)]
pub struct Database {
    /// The SQLite connection pool.
    pool: SqlitePool,
}

impl Database {
    /// Opens the pool and, unless disabled, creates the entity tables.
    ///
    /// File databases are created when missing and opened with WAL
    /// journaling and NORMAL synchronous writes.
    ///
    /// ## Returns
    /// * `Err(DbError::ConnectionFailed)` - file could not be opened
    /// * `Err(..)` - a CREATE statement failed
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(path = %config.database_path.display(), "Opening database");

        let pool = if config.is_in_memory() {
            // A private in-memory database lives exactly as long as its one
            // connection, so that connection is never reaped.
            let options = SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .acquire_timeout(config.connect_timeout)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await
                .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
        } else {
            let connect_url = format!("sqlite://{}?mode=rwc", config.database_path.display());

            let options = SqliteConnectOptions::from_str(&connect_url)
                .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal)
                .create_if_missing(true);

            SqlitePoolOptions::new()
                .max_connections(config.max_connections)
                .min_connections(config.min_connections)
                .acquire_timeout(config.connect_timeout)
                .idle_timeout(Some(config.idle_timeout))
                .connect_with(options)
                .await
                .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
        };

        debug!(
            max_connections = config.max_connections,
            in_memory = config.is_in_memory(),
            "Pool ready"
        );

        let db = Database { pool };

        if config.ensure_schema {
            db.ensure_schema().await?;
        }

        Ok(db)
    }

    /// Creates every entity table that does not exist yet.
    ///
    /// Idempotent: CREATE statements carry `IF NOT EXISTS`.
    pub async fn ensure_schema(&self) -> DbResult<()> {
        info!("Ensuring entity tables");
        let executor = self.executor();
        for entity in Entity::ALL {
            let stmt = build(QueryKind::Create, entity.model(), &QueryParams::new())?;
            executor.execute(&stmt, &[]).await?;
            debug!(table = %entity, "Table ready");
        }
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// A fresh executor on this pool.
    pub fn executor(&self) -> Executor {
        Executor::new(self.pool.clone())
    }

    /// Generic repository for any entity.
    pub fn repository(&self, entity: Entity) -> Repository {
        Repository::new(entity.model(), self.executor())
    }

    pub fn contacts(&self) -> ContactRepository {
        ContactRepository::new(self.executor())
    }

    pub fn customers(&self) -> CustomerRepository {
        CustomerRepository::new(self.executor())
    }

    pub fn employees(&self) -> EmployeeRepository {
        EmployeeRepository::new(self.executor())
    }

    pub fn products(&self) -> ProductRepository {
        ProductRepository::new(self.executor())
    }

    pub fn visits(&self) -> VisitRepository {
        VisitRepository::new(self.executor())
    }

    /// Order lines of visits.
    pub fn details(&self) -> DetailRepository {
        DetailRepository::new(self.executor())
    }

    pub fn reports(&self) -> ReportRepository {
        ReportRepository::new(self.executor())
    }

    pub fn calculator(&self) -> CalculatorRepository {
        CalculatorRepository::new(self.executor())
    }

    pub fn settings(&self) -> SettingsRepository {
        SettingsRepository::new(self.executor())
    }

    /// Waits for checked-out connections, then closes the pool. Later
    /// statements on any clone fail.
    pub async fn close(&self) {
        info!("Closing database");
        self.pool.close().await;
    }

    /// True when a trivial query round-trips.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_database_is_healthy() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(db.health_check().await);
        // Schema creation is idempotent
        db.ensure_schema().await.unwrap();
    }

    #[test]
    fn test_config_builder() {
        let config = DbConfig::new("reports.db")
            .max_connections(8)
            .min_connections(2)
            .ensure_schema(false);

        assert_eq!(config.max_connections, 8);
        assert_eq!(config.min_connections, 2);
        assert!(!config.ensure_schema);
        assert!(!config.is_in_memory());
        assert!(DbConfig::in_memory().is_in_memory());
    }

    #[tokio::test]
    async fn test_file_database_persists_tables() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fieldrep.db");

        let db = Database::new(DbConfig::new(&path)).await.unwrap();
        db.contacts().count().await.unwrap();
        db.close().await;

        let reopened = Database::new(DbConfig::new(&path).ensure_schema(false))
            .await
            .unwrap();
        assert_eq!(reopened.contacts().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_closed_pool_reports_unhealthy() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.close().await;
        assert!(!db.health_check().await);
    }
}
