//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    ///
    /// Uniqueness conflicts are reported as 400, like any other rejected input.
    pub fn http_status(&self) -> StatusCode {
        match self {
            // 404 Not Found
            Self::EmployeeNotFound => StatusCode::NOT_FOUND,

            // 500 Internal Server Error
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,

            // 400 Bad Request
            Self::ValidationFailed
            | Self::InvalidRequest
            | Self::EmployeeUsernameExists
            | Self::EmployeeEmailExists => StatusCode::BAD_REQUEST,
        }
    }
}
