//! Service errors to HTTP errors

use std::fmt::Display;

use crate::db::models::UniqueField;
use crate::services::ServiceError;
use crate::utils::{AppError, ErrorCode};

/// Convert a service failure, logging unexpected ones with `context`
///
/// Conflicts are expected outcomes and keep their message. Anything else is
/// logged server-side and reported as the generic internal error.
pub fn service_error(err: ServiceError, context: impl Display) -> AppError {
    match &err {
        ServiceError::Conflict { field, value } => {
            let (code, key) = match field {
                UniqueField::UserName => (ErrorCode::EmployeeUsernameExists, "userName"),
                UniqueField::Email => (ErrorCode::EmployeeEmailExists, "email"),
            };
            tracing::debug!(%field, %value, "Uniqueness conflict");
            AppError::with_message(code, err.to_string()).with_detail(key, value.clone())
        }
        ServiceError::Repo(e) => {
            tracing::error!(error = %e, "Error occurred while {context}");
            AppError::internal()
        }
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        service_error(err, "handling the request")
    }
}
