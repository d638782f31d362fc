//! Employee Service
//!
//! Business rules on top of one [`UnitOfWork`]:
//!
//! - `user_name` and `email` are unique; `user_name` is checked first
//! - on update an empty string leaves the field unchanged
//! - `updated_at` is refreshed on every successful update
//!
//! Write paths rely on `save_changes` being atomic. The uniqueness pre-checks
//! can race with a concurrent request; the store's unique index then rejects
//! the write and the violation is reported as the same [`ServiceError::Conflict`].

use chrono::Utc;
use shared::models::{EmployeeCreate, EmployeeResponse, EmployeeUpdate};
use thiserror::Error;

use crate::db::models::{Employee, EmployeeId, UniqueField};
use crate::db::repository::RepoError;
use crate::db::unit_of_work::UnitOfWork;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{}", conflict_message(.field, .value))]
    Conflict { field: UniqueField, value: String },

    #[error(transparent)]
    Repo(RepoError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl From<RepoError> for ServiceError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::UniqueViolation { field, value } => Self::Conflict { field, value },
            other => Self::Repo(other),
        }
    }
}

fn conflict_message(field: &UniqueField, value: &str) -> String {
    match field {
        UniqueField::UserName => format!("UserName '{value}' is already taken."),
        UniqueField::Email => format!("Email '{value}' is already registered."),
    }
}

impl From<Employee> for EmployeeResponse {
    fn from(e: Employee) -> Self {
        Self {
            id: e.id,
            first_name: e.first_name,
            last_name: e.last_name,
            user_name: e.user_name,
            email: e.email,
            age: e.age,
            created_at: e.created_at,
            updated_at: e.updated_at,
        }
    }
}

/// Treats `Some("")` the same as `None`
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

pub struct EmployeeService {
    uow: Box<dyn UnitOfWork>,
}

impl EmployeeService {
    pub fn new(uow: Box<dyn UnitOfWork>) -> Self {
        Self { uow }
    }

    pub async fn list_all(&self) -> ServiceResult<Vec<EmployeeResponse>> {
        let employees = self.uow.employees().get_all().await?;
        Ok(employees.into_iter().map(Into::into).collect())
    }

    /// `None` means not found
    pub async fn get_by_id(&self, id: EmployeeId) -> ServiceResult<Option<EmployeeResponse>> {
        let employee = self.uow.employees().get_by_id(id).await?;
        Ok(employee.map(Into::into))
    }

    pub async fn create(&mut self, input: EmployeeCreate) -> ServiceResult<EmployeeResponse> {
        let repo = self.uow.employees();
        if !repo.is_user_name_unique(&input.user_name, None).await? {
            return Err(ServiceError::Conflict {
                field: UniqueField::UserName,
                value: input.user_name,
            });
        }
        if !repo.is_email_unique(&input.email, None).await? {
            return Err(ServiceError::Conflict {
                field: UniqueField::Email,
                value: input.email,
            });
        }

        let mut employee = Employee::new(
            input.first_name,
            input.last_name,
            input.user_name,
            input.email,
            input.age,
            Utc::now(),
        );
        repo.add(employee.clone()).await;
        let saved = self.uow.save_changes().await?;
        employee.id = saved.last_inserted_id()?;

        tracing::info!(id = employee.id, user_name = %employee.user_name, "Employee created");
        Ok(employee.into())
    }

    /// `None` means not found
    pub async fn update(
        &mut self,
        id: EmployeeId,
        input: EmployeeUpdate,
    ) -> ServiceResult<Option<EmployeeResponse>> {
        let repo = self.uow.employees();
        let Some(mut employee) = repo.get_by_id(id).await? else {
            return Ok(None);
        };

        if let Some(user_name) = non_empty(input.user_name)
            && user_name != employee.user_name
        {
            if !repo.is_user_name_unique(&user_name, Some(id)).await? {
                return Err(ServiceError::Conflict {
                    field: UniqueField::UserName,
                    value: user_name,
                });
            }
            employee.user_name = user_name;
        }

        if let Some(email) = non_empty(input.email)
            && email != employee.email
        {
            if !repo.is_email_unique(&email, Some(id)).await? {
                return Err(ServiceError::Conflict {
                    field: UniqueField::Email,
                    value: email,
                });
            }
            employee.email = email;
        }

        if let Some(first_name) = non_empty(input.first_name) {
            employee.first_name = first_name;
        }
        if let Some(last_name) = non_empty(input.last_name) {
            employee.last_name = last_name;
        }
        if let Some(age) = input.age {
            employee.age = age;
        }

        // Never move backwards, even if the clock does
        employee.updated_at = Utc::now().max(employee.updated_at);

        repo.update(employee.clone()).await;
        self.uow.save_changes().await?;

        tracing::info!(id, "Employee updated");
        Ok(Some(employee.into()))
    }

    /// `false` means not found
    pub async fn delete(&mut self, id: EmployeeId) -> ServiceResult<bool> {
        let repo = self.uow.employees();
        let Some(employee) = repo.get_by_id(id).await? else {
            return Ok(false);
        };

        repo.remove(employee).await;
        self.uow.save_changes().await?;

        tracing::info!(id, "Employee deleted");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::db::context::SavedChanges;
    use crate::db::memory::{MemoryStore, MemoryUnitOfWork};
    use crate::db::repository::{EmployeeRepository, RepoResult};

    fn service(store: &MemoryStore) -> EmployeeService {
        EmployeeService::new(Box::new(MemoryUnitOfWork::new(store.clone())))
    }

    fn ada() -> EmployeeCreate {
        EmployeeCreate {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            user_name: "ada".into(),
            email: "ada@x.com".into(),
            age: 36,
        }
    }

    fn grace() -> EmployeeCreate {
        EmployeeCreate {
            first_name: "Grace".into(),
            last_name: "Hopper".into(),
            user_name: "grace".into(),
            email: "grace@x.com".into(),
            age: 45,
        }
    }

    #[tokio::test]
    async fn test_create_then_get_returns_same_view() {
        let store = MemoryStore::new();
        let created = service(&store).create(ada()).await.unwrap();

        assert!(created.id > 0);
        assert_eq!(created.created_at, created.updated_at);

        let fetched = service(&store).get_by_id(created.id).await.unwrap();
        assert_eq!(fetched, Some(created));
    }

    /// Renames every employee it just inserted through a second unit of
    /// work, as a concurrent request would right after the commit
    struct RenameAfterSave {
        inner: MemoryUnitOfWork,
        store: MemoryStore,
    }

    #[async_trait]
    impl UnitOfWork for RenameAfterSave {
        fn employees(&self) -> &dyn EmployeeRepository {
            self.inner.employees()
        }

        async fn save_changes(&mut self) -> RepoResult<SavedChanges> {
            let saved = self.inner.save_changes().await?;
            let mut other = MemoryUnitOfWork::new(self.store.clone());
            for &id in &saved.inserted_ids {
                if let Some(mut employee) = other.employees().get_by_id(id).await? {
                    employee.user_name = format!("renamed-{id}");
                    other.employees().update(employee).await;
                }
            }
            other.save_changes().await?;
            Ok(saved)
        }

        async fn begin_transaction(&mut self) -> RepoResult<()> {
            self.inner.begin_transaction().await
        }

        async fn commit_transaction(&mut self) -> RepoResult<()> {
            self.inner.commit_transaction().await
        }

        async fn rollback_transaction(&mut self) -> RepoResult<()> {
            self.inner.rollback_transaction().await
        }
    }

    #[tokio::test]
    async fn test_create_returns_assigned_id_despite_concurrent_rename() {
        let store = MemoryStore::new();
        service(&store).create(grace()).await.unwrap();

        let mut racing = EmployeeService::new(Box::new(RenameAfterSave {
            inner: MemoryUnitOfWork::new(store.clone()),
            store: store.clone(),
        }));
        let created = racing.create(ada()).await.unwrap();

        assert_eq!(created.id, 2);
        assert_eq!(created.user_name, "ada");
        assert_eq!(created.email, "ada@x.com");
        assert_eq!(store.len(), 2);

        let stored = service(&store).get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(stored.user_name, "renamed-2");
        assert_eq!(stored.email, created.email);
        assert_eq!(stored.created_at, created.created_at);
    }

    #[tokio::test]
    async fn test_create_duplicate_user_name_conflicts() {
        let store = MemoryStore::new();
        service(&store).create(ada()).await.unwrap();

        let mut input = grace();
        input.user_name = "ada".into();
        let err = service(&store).create(input).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Conflict { field: UniqueField::UserName, ref value } if value == "ada"
        ));
        assert_eq!(err.to_string(), "UserName 'ada' is already taken.");
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_create_duplicate_email_conflicts() {
        let store = MemoryStore::new();
        service(&store).create(ada()).await.unwrap();

        let mut input = grace();
        input.email = "ada@x.com".into();
        let err = service(&store).create(input).await.unwrap_err();
        assert_eq!(err.to_string(), "Email 'ada@x.com' is already registered.");
    }

    #[tokio::test]
    async fn test_create_reports_user_name_before_email() {
        let store = MemoryStore::new();
        service(&store).create(ada()).await.unwrap();

        let err = service(&store).create(ada()).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Conflict {
                field: UniqueField::UserName,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_list_all() {
        let store = MemoryStore::new();
        assert!(service(&store).list_all().await.unwrap().is_empty());

        service(&store).create(ada()).await.unwrap();
        service(&store).create(grace()).await.unwrap();

        let mut names: Vec<String> = service(&store)
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.user_name)
            .collect();
        names.sort();
        assert_eq!(names, ["ada", "grace"]);
    }

    #[tokio::test]
    async fn test_update_missing_returns_none() {
        let store = MemoryStore::new();
        let result = service(&store)
            .update(42, EmployeeUpdate::default())
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_update_own_user_name_is_not_a_conflict() {
        let store = MemoryStore::new();
        let created = service(&store).create(ada()).await.unwrap();

        let input = EmployeeUpdate {
            user_name: Some("ada".into()),
            email: Some("ada@x.com".into()),
            ..Default::default()
        };
        let updated = service(&store)
            .update(created.id, input)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.user_name, "ada");
        assert_eq!(updated.email, "ada@x.com");
    }

    #[tokio::test]
    async fn test_update_to_taken_values_conflicts() {
        let store = MemoryStore::new();
        service(&store).create(ada()).await.unwrap();
        let grace = service(&store).create(grace()).await.unwrap();

        let input = EmployeeUpdate {
            user_name: Some("ada".into()),
            ..Default::default()
        };
        let err = service(&store).update(grace.id, input).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Conflict {
                field: UniqueField::UserName,
                ..
            }
        ));

        let input = EmployeeUpdate {
            email: Some("ada@x.com".into()),
            ..Default::default()
        };
        let err = service(&store).update(grace.id, input).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Conflict {
                field: UniqueField::Email,
                ..
            }
        ));

        let unchanged = service(&store).get_by_id(grace.id).await.unwrap().unwrap();
        assert_eq!(unchanged, grace);
    }

    #[tokio::test]
    async fn test_update_empty_and_absent_fields_are_ignored() {
        let store = MemoryStore::new();
        let created = service(&store).create(ada()).await.unwrap();

        let input = EmployeeUpdate {
            first_name: Some(String::new()),
            last_name: Some(String::new()),
            user_name: Some(String::new()),
            email: None,
            age: None,
        };
        let updated = service(&store)
            .update(created.id, input)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.first_name, created.first_name);
        assert_eq!(updated.last_name, created.last_name);
        assert_eq!(updated.user_name, created.user_name);
        assert_eq!(updated.email, created.email);
        assert_eq!(updated.age, created.age);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[tokio::test]
    async fn test_update_applies_supplied_fields() {
        let store = MemoryStore::new();
        let created = service(&store).create(ada()).await.unwrap();

        // age is not range-checked here; that happens at the boundary
        let input = EmployeeUpdate {
            first_name: Some("Augusta".into()),
            user_name: Some("augusta".into()),
            email: Some("augusta@x.com".into()),
            age: Some(7),
            ..Default::default()
        };
        let updated = service(&store)
            .update(created.id, input)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.first_name, "Augusta");
        assert_eq!(updated.last_name, "Lovelace");
        assert_eq!(updated.user_name, "augusta");
        assert_eq!(updated.email, "augusta@x.com");
        assert_eq!(updated.age, 7);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);
        assert!(updated.updated_at >= updated.created_at);

        let fetched = service(&store).get_by_id(created.id).await.unwrap();
        assert_eq!(fetched, Some(updated));
    }

    #[tokio::test]
    async fn test_delete() {
        let store = MemoryStore::new();
        let created = service(&store).create(ada()).await.unwrap();

        assert!(!service(&store).delete(created.id + 1).await.unwrap());
        assert!(service(&store).delete(created.id).await.unwrap());
        assert!(service(&store).get_by_id(created.id).await.unwrap().is_none());
        assert!(!service(&store).delete(created.id).await.unwrap());
    }

    #[test]
    fn test_repo_unique_violation_becomes_conflict() {
        let err: ServiceError = RepoError::UniqueViolation {
            field: UniqueField::Email,
            value: "ada@x.com".into(),
        }
        .into();
        assert!(matches!(err, ServiceError::Conflict { .. }));

        let err: ServiceError = RepoError::TransactionAlreadyActive.into();
        assert!(matches!(err, ServiceError::Repo(_)));
    }
}
