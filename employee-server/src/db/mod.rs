//! Database Module
//!
//! Handles the SQLite connection pool and migrations, and hosts the data
//! access layers built on top of it:
//!
//! - [`repository`] - employee repository trait and its sqlx implementation
//! - [`unit_of_work`] - transaction boundary owning the repository
//! - [`context`] - per-unit-of-work session and change tracker
//! - [`memory`] - in-memory store implementing the same traits

pub mod context;
pub mod memory;
pub mod models;
pub mod repository;
pub mod unit_of_work;

pub use context::{DbContext, PendingChange, SavedChanges};
pub use memory::{MemoryStore, MemoryUnitOfWork, MemoryUnitOfWorkFactory};
pub use models::{Employee, EmployeeId, UniqueField};
pub use repository::{EmployeeRepository, RepoError, RepoResult, SqlEmployeeRepository};
pub use unit_of_work::{SqlUnitOfWork, SqlUnitOfWorkFactory, UnitOfWork, UnitOfWorkFactory};

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use std::str::FromStr;
use std::time::Duration;

/// Database service, owns the SQLite connection pool
#[derive(Clone, Debug)]
pub struct DbService {
    pub pool: SqlitePool,
}

impl DbService {
    /// Open (or create) the database at `db_path` in WAL mode and apply migrations
    pub async fn new(db_path: &str, max_connections: u32) -> RepoResult<Self> {
        let options = SqliteConnectOptions::from_str(&format!("sqlite:{db_path}"))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            // wait up to 5s on a write lock instead of failing with SQLITE_BUSY
            .busy_timeout(Duration::from_secs(5))
            .optimize_on_close(true, None);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(options)
            .await?;

        tracing::info!(path = %db_path, "Database connection established (SQLite WAL, busy_timeout=5000ms)");

        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");

        Ok(Self { pool })
    }

    /// Close the pool; units of work created afterwards fail with a database error
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
