//! In-memory store
//!
//! Implements [`EmployeeRepository`] and [`UnitOfWork`] without a database.
//! Mirrors the SQLite behaviour that matters to callers: ids come from a
//! counter, `user_name` / `email` are unique (case-sensitive), a save is
//! all-or-nothing, and an explicit transaction works on a private copy that
//! is replayed onto the shared table at commit.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::context::{PendingChange, SavedChanges};
use super::models::{Employee, EmployeeId, UniqueField};
use super::repository::{EmployeeRepository, RepoError, RepoResult};
use super::unit_of_work::{UnitOfWork, UnitOfWorkFactory};

#[derive(Debug, Clone, Default)]
struct MemoryTable {
    rows: BTreeMap<EmployeeId, Employee>,
}

impl MemoryTable {
    fn conflict(&self, employee: &Employee) -> Option<UniqueField> {
        [UniqueField::UserName, UniqueField::Email]
            .into_iter()
            .find(|field| {
                self.rows.values().any(|row| {
                    row.id != employee.id && field.value_of(row) == field.value_of(employee)
                })
            })
    }

    fn check_unique(&self, employee: &Employee) -> RepoResult<()> {
        match self.conflict(employee) {
            Some(field) => Err(RepoError::UniqueViolation {
                field,
                value: field.value_of(employee).to_string(),
            }),
            None => Ok(()),
        }
    }

    fn apply(&mut self, change: &PendingChange) -> RepoResult<u64> {
        match change {
            PendingChange::Insert(employee) => {
                self.check_unique(employee)?;
                self.rows.insert(employee.id, employee.clone());
                Ok(1)
            }
            PendingChange::Update(employee) => {
                let Some(created_at) = self.rows.get(&employee.id).map(|row| row.created_at)
                else {
                    return Ok(0);
                };
                self.check_unique(employee)?;
                let mut row = employee.clone();
                row.created_at = created_at;
                self.rows.insert(row.id, row);
                Ok(1)
            }
            PendingChange::Delete(id) => Ok(self.rows.remove(id).map_or(0, |_| 1)),
        }
    }

    /// Apply every change to a copy; the copy is returned only if all succeed
    fn apply_all(&self, changes: &[PendingChange]) -> RepoResult<(MemoryTable, u64)> {
        let mut table = self.clone();
        let mut affected = 0;
        for change in changes {
            affected += table.apply(change)?;
        }
        Ok((table, affected))
    }
}

#[derive(Debug)]
struct StoreInner {
    table: MemoryTable,
    next_id: EmployeeId,
}

/// Shared in-memory table; clones share the same data
#[derive(Debug, Clone)]
pub struct MemoryStore {
    inner: Arc<Mutex<StoreInner>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(StoreInner {
                table: MemoryTable::default(),
                next_id: 1,
            })),
        }
    }

    /// Number of committed rows
    pub fn len(&self) -> usize {
        self.inner.lock().table.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ids are never reused, even when the insert is rolled back
    fn next_id(&self) -> EmployeeId {
        let mut inner = self.inner.lock();
        let id = inner.next_id;
        inner.next_id += 1;
        id
    }

    fn snapshot(&self) -> MemoryTable {
        self.inner.lock().table.clone()
    }

    fn read<T>(&self, f: impl FnOnce(&MemoryTable) -> T) -> T {
        f(&self.inner.lock().table)
    }

    fn commit(&self, changes: &[PendingChange]) -> RepoResult<u64> {
        let mut inner = self.inner.lock();
        let (table, affected) = inner.table.apply_all(changes)?;
        inner.table = table;
        Ok(affected)
    }
}

struct MemoryTransaction {
    working: MemoryTable,
    log: Vec<PendingChange>,
}

struct MemorySession {
    store: MemoryStore,
    transaction: Option<MemoryTransaction>,
    pending: Vec<PendingChange>,
}

impl MemorySession {
    fn read<T>(&self, f: impl FnOnce(&MemoryTable) -> T) -> T {
        match &self.transaction {
            Some(tx) => f(&tx.working),
            None => self.store.read(f),
        }
    }

    fn save_changes(&mut self) -> RepoResult<SavedChanges> {
        let mut inserted_ids = Vec::new();
        let changes: Vec<PendingChange> = std::mem::take(&mut self.pending)
            .into_iter()
            .map(|change| match change {
                PendingChange::Insert(mut employee) => {
                    employee.id = self.store.next_id();
                    inserted_ids.push(employee.id);
                    PendingChange::Insert(employee)
                }
                other => other,
            })
            .collect();
        if changes.is_empty() {
            return Ok(SavedChanges::default());
        }

        let rows_affected = match self.transaction.as_mut() {
            Some(tx) => {
                let (working, affected) = tx.working.apply_all(&changes)?;
                tx.working = working;
                tx.log.extend(changes);
                affected
            }
            None => self.store.commit(&changes)?,
        };
        Ok(SavedChanges {
            rows_affected,
            inserted_ids,
        })
    }
}

/// Repository view over a [`MemorySession`]
#[derive(Clone)]
pub struct MemoryEmployeeRepository {
    session: Arc<Mutex<MemorySession>>,
}

impl MemoryEmployeeRepository {
    fn find(&self, predicate: impl Fn(&Employee) -> bool) -> Option<Employee> {
        self.session
            .lock()
            .read(|table| table.rows.values().find(|row| predicate(row)).cloned())
    }

    fn is_free(&self, field: UniqueField, value: &str, exclude_id: Option<EmployeeId>) -> bool {
        self.find(|row| Some(row.id) != exclude_id && field.value_of(row) == value)
            .is_none()
    }
}

#[async_trait]
impl EmployeeRepository for MemoryEmployeeRepository {
    async fn get_all(&self) -> RepoResult<Vec<Employee>> {
        Ok(self
            .session
            .lock()
            .read(|table| table.rows.values().cloned().collect()))
    }

    async fn get_by_id(&self, id: EmployeeId) -> RepoResult<Option<Employee>> {
        Ok(self
            .session
            .lock()
            .read(|table| table.rows.get(&id).cloned()))
    }

    async fn get_by_user_name(&self, user_name: &str) -> RepoResult<Option<Employee>> {
        Ok(self.find(|row| row.user_name == user_name))
    }

    async fn get_by_email(&self, email: &str) -> RepoResult<Option<Employee>> {
        Ok(self.find(|row| row.email == email))
    }

    async fn add(&self, employee: Employee) {
        self.session.lock().pending.push(PendingChange::Insert(employee));
    }

    async fn update(&self, employee: Employee) {
        self.session.lock().pending.push(PendingChange::Update(employee));
    }

    async fn remove(&self, employee: Employee) {
        self.session
            .lock()
            .pending
            .push(PendingChange::Delete(employee.id));
    }

    async fn is_user_name_unique(
        &self,
        user_name: &str,
        exclude_id: Option<EmployeeId>,
    ) -> RepoResult<bool> {
        Ok(self.is_free(UniqueField::UserName, user_name, exclude_id))
    }

    async fn is_email_unique(
        &self,
        email: &str,
        exclude_id: Option<EmployeeId>,
    ) -> RepoResult<bool> {
        Ok(self.is_free(UniqueField::Email, email, exclude_id))
    }
}

pub struct MemoryUnitOfWork {
    session: Arc<Mutex<MemorySession>>,
    employees: MemoryEmployeeRepository,
}

impl MemoryUnitOfWork {
    pub fn new(store: MemoryStore) -> Self {
        let session = Arc::new(Mutex::new(MemorySession {
            store,
            transaction: None,
            pending: Vec::new(),
        }));
        Self {
            employees: MemoryEmployeeRepository {
                session: session.clone(),
            },
            session,
        }
    }
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    fn employees(&self) -> &dyn EmployeeRepository {
        &self.employees
    }

    async fn save_changes(&mut self) -> RepoResult<SavedChanges> {
        self.session.lock().save_changes()
    }

    async fn begin_transaction(&mut self) -> RepoResult<()> {
        let mut session = self.session.lock();
        if session.transaction.is_some() {
            return Err(RepoError::TransactionAlreadyActive);
        }
        let working = session.store.snapshot();
        session.transaction = Some(MemoryTransaction {
            working,
            log: Vec::new(),
        });
        Ok(())
    }

    async fn commit_transaction(&mut self) -> RepoResult<()> {
        let mut session = self.session.lock();
        if let Some(tx) = session.transaction.take() {
            session.store.commit(&tx.log)?;
        }
        Ok(())
    }

    async fn rollback_transaction(&mut self) -> RepoResult<()> {
        self.session.lock().transaction = None;
        Ok(())
    }
}

/// Hands out units of work over one shared [`MemoryStore`]
#[derive(Debug, Clone, Default)]
pub struct MemoryUnitOfWorkFactory {
    store: MemoryStore,
}

impl MemoryUnitOfWorkFactory {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }
}

impl UnitOfWorkFactory for MemoryUnitOfWorkFactory {
    fn create(&self) -> Box<dyn UnitOfWork> {
        Box::new(MemoryUnitOfWork::new(self.store.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn employee(user_name: &str, email: &str) -> Employee {
        Employee::new("Ada", "Lovelace", user_name, email, 36, Utc::now())
    }

    #[tokio::test]
    async fn test_add_is_staged_until_save() {
        let store = MemoryStore::new();
        let mut uow = MemoryUnitOfWork::new(store.clone());

        uow.employees().add(employee("ada", "ada@x.com")).await;
        assert!(store.is_empty());
        assert!(uow.employees().get_by_user_name("ada").await.unwrap().is_none());

        let result = uow.save_changes().await.unwrap();
        assert_eq!(result.rows_affected, 1);
        assert_eq!(result.inserted_ids, [1]);
        let saved = uow.employees().get_by_user_name("ada").await.unwrap().unwrap();
        assert_eq!(saved.id, 1);
        assert!(!saved.is_transient());
        assert_eq!(uow.save_changes().await.unwrap(), SavedChanges::default());
    }

    #[tokio::test]
    async fn test_save_is_all_or_nothing() {
        let store = MemoryStore::new();
        let mut uow = MemoryUnitOfWork::new(store.clone());

        uow.employees().add(employee("ada", "ada@x.com")).await;
        uow.employees().add(employee("grace", "ada@x.com")).await;

        let err = uow.save_changes().await.unwrap_err();
        assert!(matches!(
            err,
            RepoError::UniqueViolation { field: UniqueField::Email, ref value } if value == "ada@x.com"
        ));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_uniqueness_is_case_sensitive() {
        let store = MemoryStore::new();
        let mut uow = MemoryUnitOfWork::new(store.clone());

        uow.employees().add(employee("ada", "ada@x.com")).await;
        uow.employees().add(employee("Ada", "Ada@x.com")).await;
        assert_eq!(uow.save_changes().await.unwrap().rows_affected, 2);
        assert!(!uow.employees().is_user_name_unique("ada", None).await.unwrap());
        assert!(uow.employees().is_user_name_unique("ADA", None).await.unwrap());
    }

    #[tokio::test]
    async fn test_unique_check_excludes_id() {
        let store = MemoryStore::new();
        let mut uow = MemoryUnitOfWork::new(store);
        uow.employees().add(employee("ada", "ada@x.com")).await;
        uow.save_changes().await.unwrap();

        assert!(!uow.employees().is_email_unique("ada@x.com", None).await.unwrap());
        assert!(uow.employees().is_email_unique("ada@x.com", Some(1)).await.unwrap());
        assert!(!uow.employees().is_email_unique("ada@x.com", Some(2)).await.unwrap());
    }

    #[tokio::test]
    async fn test_transaction_rollback_discards() {
        let store = MemoryStore::new();
        let mut uow = MemoryUnitOfWork::new(store.clone());

        uow.begin_transaction().await.unwrap();
        uow.employees().add(employee("ada", "ada@x.com")).await;
        uow.save_changes().await.unwrap();
        // visible inside the transaction only
        assert!(uow.employees().get_by_user_name("ada").await.unwrap().is_some());
        assert!(store.is_empty());

        uow.rollback_transaction().await.unwrap();
        assert!(uow.employees().get_by_user_name("ada").await.unwrap().is_none());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_transaction_commit_publishes() {
        let store = MemoryStore::new();
        let mut uow = MemoryUnitOfWork::new(store.clone());

        uow.begin_transaction().await.unwrap();
        assert!(matches!(
            uow.begin_transaction().await,
            Err(RepoError::TransactionAlreadyActive)
        ));
        uow.employees().add(employee("ada", "ada@x.com")).await;
        uow.save_changes().await.unwrap();
        uow.commit_transaction().await.unwrap();

        assert_eq!(store.len(), 1);
        // commit and rollback without a transaction are no-ops
        uow.commit_transaction().await.unwrap();
        uow.rollback_transaction().await.unwrap();
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_update_keeps_created_at() {
        let store = MemoryStore::new();
        let mut uow = MemoryUnitOfWork::new(store);
        uow.employees().add(employee("ada", "ada@x.com")).await;
        uow.save_changes().await.unwrap();

        let mut saved = uow.employees().get_by_id(1).await.unwrap().unwrap();
        let created_at = saved.created_at;
        saved.created_at = Utc::now() + chrono::Duration::days(1);
        saved.age = 40;
        uow.employees().update(saved).await;
        let result = uow.save_changes().await.unwrap();
        assert_eq!(result.rows_affected, 1);
        assert!(result.inserted_ids.is_empty());

        let reloaded = uow.employees().get_by_id(1).await.unwrap().unwrap();
        assert_eq!(reloaded.age, 40);
        assert_eq!(reloaded.created_at, created_at);
    }
}
