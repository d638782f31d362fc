//! Unit of Work
//!
//! Transaction boundary and repository holder. One instance per request:
//! built by a [`UnitOfWorkFactory`], dropped when the request completes.
//!
//! # Guarantees
//!
//! - At most one explicit transaction is active per instance
//! - `commit_transaction` / `rollback_transaction` are no-ops without one
//! - `save_changes` is atomic on its own (implicit transaction)
//! - Dropping the instance releases its connection and rolls back any
//!   open transaction

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::SqlitePool;
use tokio::sync::Mutex;

use super::context::{DbContext, SavedChanges};
use super::repository::{EmployeeRepository, RepoResult, SqlEmployeeRepository};

#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// Repository bound to this unit of work
    fn employees(&self) -> &dyn EmployeeRepository;

    /// Flush staged changes; returns the affected row count and the ids
    /// assigned to inserted rows
    async fn save_changes(&mut self) -> RepoResult<SavedChanges>;

    async fn begin_transaction(&mut self) -> RepoResult<()>;
    async fn commit_transaction(&mut self) -> RepoResult<()>;
    async fn rollback_transaction(&mut self) -> RepoResult<()>;
}

/// Creates a fresh unit of work for every request
pub trait UnitOfWorkFactory: Send + Sync {
    fn create(&self) -> Box<dyn UnitOfWork>;
}

/// Unit of work over the SQLite pool
pub struct SqlUnitOfWork {
    ctx: Arc<Mutex<DbContext>>,
    employees: SqlEmployeeRepository,
}

impl SqlUnitOfWork {
    pub fn new(pool: SqlitePool) -> Self {
        let ctx = Arc::new(Mutex::new(DbContext::new(pool)));
        Self {
            employees: SqlEmployeeRepository::new(ctx.clone()),
            ctx,
        }
    }

    /// Whether an explicit transaction is currently open
    pub async fn has_transaction(&self) -> bool {
        self.ctx.lock().await.has_transaction()
    }
}

#[async_trait]
impl UnitOfWork for SqlUnitOfWork {
    fn employees(&self) -> &dyn EmployeeRepository {
        &self.employees
    }

    async fn save_changes(&mut self) -> RepoResult<SavedChanges> {
        self.ctx.lock().await.save_changes().await
    }

    async fn begin_transaction(&mut self) -> RepoResult<()> {
        self.ctx.lock().await.begin_transaction().await
    }

    async fn commit_transaction(&mut self) -> RepoResult<()> {
        self.ctx.lock().await.commit_transaction().await
    }

    async fn rollback_transaction(&mut self) -> RepoResult<()> {
        self.ctx.lock().await.rollback_transaction().await
    }
}

#[derive(Clone, Debug)]
pub struct SqlUnitOfWorkFactory {
    pool: SqlitePool,
}

impl SqlUnitOfWorkFactory {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl UnitOfWorkFactory for SqlUnitOfWorkFactory {
    fn create(&self) -> Box<dyn UnitOfWork> {
        Box::new(SqlUnitOfWork::new(self.pool.clone()))
    }
}
