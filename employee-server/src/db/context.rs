//! Database Context
//!
//! One [`DbContext`] backs one unit of work. It holds:
//!
//! - the shared connection pool
//! - the explicit transaction, if one was begun
//! - the change tracker: writes staged by the repository until `save_changes`
//!
//! Dropping the context discards staged changes and rolls back an open
//! transaction (sqlx rolls back a `Transaction` on drop).

use std::ops::{Deref, DerefMut};

use sqlx::pool::PoolConnection;
use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};

use super::models::{Employee, EmployeeId, UniqueField};
use super::repository::{RepoError, RepoResult};

/// A write staged by the repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingChange {
    Insert(Employee),
    Update(Employee),
    Delete(EmployeeId),
}

/// Outcome of one `save_changes`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SavedChanges {
    pub rows_affected: u64,
    /// Store-assigned ids of the flushed inserts, in staging order
    pub inserted_ids: Vec<EmployeeId>,
}

impl SavedChanges {
    /// Id assigned to the last flushed insert
    pub fn last_inserted_id(&self) -> RepoResult<EmployeeId> {
        self.inserted_ids
            .last()
            .copied()
            .ok_or(RepoError::Database(sqlx::Error::RowNotFound))
    }
}

/// Connection a query runs on: the open transaction or a pooled connection
pub(crate) enum Session<'a> {
    Transaction(&'a mut SqliteConnection),
    Pooled(PoolConnection<Sqlite>),
}

impl Deref for Session<'_> {
    type Target = SqliteConnection;

    fn deref(&self) -> &SqliteConnection {
        match self {
            Session::Transaction(conn) => conn,
            Session::Pooled(conn) => conn,
        }
    }
}

impl DerefMut for Session<'_> {
    fn deref_mut(&mut self) -> &mut SqliteConnection {
        match self {
            Session::Transaction(conn) => conn,
            Session::Pooled(conn) => conn,
        }
    }
}

pub struct DbContext {
    pool: SqlitePool,
    transaction: Option<Transaction<'static, Sqlite>>,
    pending: Vec<PendingChange>,
}

impl DbContext {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            transaction: None,
            pending: Vec::new(),
        }
    }

    /// Connection for a read: inside the open transaction if any
    pub(crate) async fn session(&mut self) -> RepoResult<Session<'_>> {
        match self.transaction.as_mut() {
            Some(tx) => Ok(Session::Transaction(&mut **tx)),
            None => Ok(Session::Pooled(self.pool.acquire().await?)),
        }
    }

    pub fn track(&mut self, change: PendingChange) {
        self.pending.push(change);
    }

    pub fn has_transaction(&self) -> bool {
        self.transaction.is_some()
    }

    pub async fn begin_transaction(&mut self) -> RepoResult<()> {
        if self.transaction.is_some() {
            return Err(RepoError::TransactionAlreadyActive);
        }
        self.transaction = Some(self.pool.begin().await?);
        tracing::debug!("Transaction started");
        Ok(())
    }

    /// No-op when no transaction is active
    pub async fn commit_transaction(&mut self) -> RepoResult<()> {
        if let Some(tx) = self.transaction.take() {
            tx.commit().await?;
            tracing::debug!("Transaction committed");
        }
        Ok(())
    }

    /// No-op when no transaction is active
    pub async fn rollback_transaction(&mut self) -> RepoResult<()> {
        if let Some(tx) = self.transaction.take() {
            tx.rollback().await?;
            tracing::debug!("Transaction rolled back");
        }
        Ok(())
    }

    /// Flush every staged change atomically
    ///
    /// Returns the affected row count and the ids the store assigned to the
    /// inserts, read from the insert itself.
    ///
    /// Runs inside the explicit transaction when one is open (the caller
    /// commits), otherwise inside an implicit transaction committed here.
    /// Staged changes are consumed even when the flush fails.
    pub async fn save_changes(&mut self) -> RepoResult<SavedChanges> {
        if self.pending.is_empty() {
            return Ok(SavedChanges::default());
        }
        let changes = std::mem::take(&mut self.pending);

        let saved = match self.transaction.as_mut() {
            Some(tx) => apply_changes(tx, &changes).await?,
            None => {
                let mut tx = self.pool.begin().await?;
                let saved = apply_changes(&mut tx, &changes).await?;
                tx.commit().await?;
                saved
            }
        };

        tracing::debug!(
            changes = changes.len(),
            affected = saved.rows_affected,
            "Changes saved"
        );
        Ok(saved)
    }
}

impl Drop for DbContext {
    fn drop(&mut self) {
        if !self.pending.is_empty() {
            tracing::debug!(count = self.pending.len(), "Discarding unsaved changes");
        }
        if self.transaction.is_some() {
            tracing::debug!("Releasing open transaction (rollback)");
        }
    }
}

async fn apply_changes(
    conn: &mut SqliteConnection,
    changes: &[PendingChange],
) -> RepoResult<SavedChanges> {
    let mut saved = SavedChanges::default();
    for change in changes {
        match change {
            PendingChange::Insert(e) => {
                let id: EmployeeId = sqlx::query_scalar(
                    r#"
                    INSERT INTO employees (
                        first_name, last_name, user_name, email, age, created_at, updated_at
                    )
                    VALUES (?, ?, ?, ?, ?, ?, ?)
                    RETURNING id
                    "#,
                )
                .bind(&e.first_name)
                .bind(&e.last_name)
                .bind(&e.user_name)
                .bind(&e.email)
                .bind(e.age)
                .bind(e.created_at)
                .bind(e.updated_at)
                .fetch_one(&mut *conn)
                .await
                .map_err(|err| translate(err, e))?;
                saved.inserted_ids.push(id);
                saved.rows_affected += 1;
            }

            PendingChange::Update(e) => {
                let result = sqlx::query(
                    r#"
                    UPDATE employees SET
                        first_name = ?, last_name = ?, user_name = ?,
                        email = ?, age = ?, updated_at = ?
                    WHERE id = ?
                    "#,
                )
                .bind(&e.first_name)
                .bind(&e.last_name)
                .bind(&e.user_name)
                .bind(&e.email)
                .bind(e.age)
                .bind(e.updated_at)
                .bind(e.id)
                .execute(&mut *conn)
                .await
                .map_err(|err| translate(err, e))?;
                saved.rows_affected += result.rows_affected();
            }

            PendingChange::Delete(id) => {
                let result = sqlx::query("DELETE FROM employees WHERE id = ?")
                    .bind(id)
                    .execute(&mut *conn)
                    .await?;
                saved.rows_affected += result.rows_affected();
            }
        }
    }
    Ok(saved)
}

/// Map a unique-index failure to the field and value that caused it
fn translate(err: sqlx::Error, employee: &Employee) -> RepoError {
    if let sqlx::Error::Database(db_err) = &err
        && db_err.is_unique_violation()
    {
        // SQLite: "UNIQUE constraint failed: employees.user_name"
        let message = db_err.message();
        for field in [UniqueField::UserName, UniqueField::Email] {
            if message.contains(&format!("employees.{}", field.column())) {
                return RepoError::UniqueViolation {
                    field,
                    value: field.value_of(employee).to_string(),
                };
            }
        }
    }
    RepoError::Database(err)
}
