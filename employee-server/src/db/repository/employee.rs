//! Employee Repository

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{EmployeeRepository, RepoResult};
use crate::db::context::{DbContext, PendingChange};
use crate::db::models::{Employee, EmployeeId};

const SELECT_EMPLOYEE: &str = r#"
    SELECT id, first_name, last_name, user_name, email, age, created_at, updated_at
    FROM employees
"#;

/// Store-backed repository sharing its [`DbContext`] with the owning unit of work
#[derive(Clone)]
pub struct SqlEmployeeRepository {
    ctx: Arc<Mutex<DbContext>>,
}

impl SqlEmployeeRepository {
    pub fn new(ctx: Arc<Mutex<DbContext>>) -> Self {
        Self { ctx }
    }

    async fn find_one(&self, filter: &str, value: &str) -> RepoResult<Option<Employee>> {
        let sql = format!("{SELECT_EMPLOYEE} WHERE {filter} = ? LIMIT 1");
        let mut ctx = self.ctx.lock().await;
        let mut conn = ctx.session().await?;
        let employee = sqlx::query_as::<_, Employee>(&sql)
            .bind(value)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(employee)
    }

    async fn is_taken(
        &self,
        column: &str,
        value: &str,
        exclude_id: Option<EmployeeId>,
    ) -> RepoResult<bool> {
        let sql = format!(
            "SELECT EXISTS(SELECT 1 FROM employees WHERE {column} = ? AND (? IS NULL OR id <> ?))"
        );
        let mut ctx = self.ctx.lock().await;
        let mut conn = ctx.session().await?;
        let taken: bool = sqlx::query_scalar(&sql)
            .bind(value)
            .bind(exclude_id)
            .bind(exclude_id)
            .fetch_one(&mut *conn)
            .await?;
        Ok(taken)
    }
}

#[async_trait]
impl EmployeeRepository for SqlEmployeeRepository {
    async fn get_all(&self) -> RepoResult<Vec<Employee>> {
        let mut ctx = self.ctx.lock().await;
        let mut conn = ctx.session().await?;
        let employees = sqlx::query_as::<_, Employee>(SELECT_EMPLOYEE)
            .fetch_all(&mut *conn)
            .await?;
        Ok(employees)
    }

    async fn get_by_id(&self, id: EmployeeId) -> RepoResult<Option<Employee>> {
        let sql = format!("{SELECT_EMPLOYEE} WHERE id = ?");
        let mut ctx = self.ctx.lock().await;
        let mut conn = ctx.session().await?;
        let employee = sqlx::query_as::<_, Employee>(&sql)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(employee)
    }

    async fn get_by_user_name(&self, user_name: &str) -> RepoResult<Option<Employee>> {
        self.find_one("user_name", user_name).await
    }

    async fn get_by_email(&self, email: &str) -> RepoResult<Option<Employee>> {
        self.find_one("email", email).await
    }

    async fn add(&self, employee: Employee) {
        self.ctx.lock().await.track(PendingChange::Insert(employee));
    }

    async fn update(&self, employee: Employee) {
        self.ctx.lock().await.track(PendingChange::Update(employee));
    }

    async fn remove(&self, employee: Employee) {
        self.ctx.lock().await.track(PendingChange::Delete(employee.id));
    }

    async fn is_user_name_unique(
        &self,
        user_name: &str,
        exclude_id: Option<EmployeeId>,
    ) -> RepoResult<bool> {
        Ok(!self.is_taken("user_name", user_name, exclude_id).await?)
    }

    async fn is_email_unique(
        &self,
        email: &str,
        exclude_id: Option<EmployeeId>,
    ) -> RepoResult<bool> {
        Ok(!self.is_taken("email", email, exclude_id).await?)
    }
}
