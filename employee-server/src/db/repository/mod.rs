//! Repository Module
//!
//! Data access for the `employees` table. No business validation happens
//! here and no transaction is opened: writes are staged and flushed by the
//! owning [`UnitOfWork`](super::UnitOfWork).

pub mod employee;

pub use employee::SqlEmployeeRepository;

use async_trait::async_trait;
use thiserror::Error;

use super::models::{Employee, EmployeeId, UniqueField};

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Duplicate {field}: '{value}'")]
    UniqueViolation { field: UniqueField, value: String },

    #[error("A transaction is already active")]
    TransactionAlreadyActive,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Employee data access
///
/// Reads hit the store (inside the open transaction if there is one).
/// `add`, `update` and `remove` only stage the change; nothing is written
/// until [`UnitOfWork::save_changes`](super::UnitOfWork::save_changes).
#[async_trait]
pub trait EmployeeRepository: Send + Sync {
    async fn get_all(&self) -> RepoResult<Vec<Employee>>;
    async fn get_by_id(&self, id: EmployeeId) -> RepoResult<Option<Employee>>;
    async fn get_by_user_name(&self, user_name: &str) -> RepoResult<Option<Employee>>;
    async fn get_by_email(&self, email: &str) -> RepoResult<Option<Employee>>;

    /// Stage an insert; the id carried by `employee` is ignored
    async fn add(&self, employee: Employee);
    /// Stage a full-row update keyed by `employee.id` (`created_at` is never rewritten)
    async fn update(&self, employee: Employee);
    /// Stage a hard delete
    async fn remove(&self, employee: Employee);

    /// True when no other row (ignoring `exclude_id`) uses `user_name`
    async fn is_user_name_unique(
        &self,
        user_name: &str,
        exclude_id: Option<EmployeeId>,
    ) -> RepoResult<bool>;

    /// True when no other row (ignoring `exclude_id`) uses `email`
    async fn is_email_unique(&self, email: &str, exclude_id: Option<EmployeeId>)
    -> RepoResult<bool>;
}
