//! Employee Model

use chrono::{DateTime, Utc};
use std::fmt;

/// Employee ID type (SQLite INTEGER PRIMARY KEY)
pub type EmployeeId = i64;

/// Employee row as stored in the `employees` table
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Employee {
    /// Assigned by the store; `0` until the row has been saved
    pub id: EmployeeId,
    pub first_name: String,
    pub last_name: String,
    pub user_name: String,
    pub email: String,
    pub age: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Employee {
    /// Build a not-yet-persisted employee stamped with `now`
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        user_name: impl Into<String>,
        email: impl Into<String>,
        age: i32,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: 0,
            first_name: first_name.into(),
            last_name: last_name.into(),
            user_name: user_name.into(),
            email: email.into(),
            age,
            created_at: now,
            updated_at: now,
        }
    }

    /// True until the store has assigned an id
    pub fn is_transient(&self) -> bool {
        self.id == 0
    }
}

/// Columns guarded by a unique index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniqueField {
    UserName,
    Email,
}

impl UniqueField {
    /// Column name in the `employees` table
    pub fn column(&self) -> &'static str {
        match self {
            Self::UserName => "user_name",
            Self::Email => "email",
        }
    }

    /// Value of this field on `employee`
    pub fn value_of<'a>(&self, employee: &'a Employee) -> &'a str {
        match self {
            Self::UserName => &employee.user_name,
            Self::Email => &employee.email,
        }
    }
}

impl fmt::Display for UniqueField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UserName => write!(f, "UserName"),
            Self::Email => write!(f, "Email"),
        }
    }
}
