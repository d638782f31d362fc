//! Employee Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

pub const MAX_NAME_LEN: u64 = 100;
pub const MAX_USERNAME_LEN: u64 = 50;
pub const MAX_EMAIL_LEN: u64 = 255;
pub const MIN_AGE: i32 = 18;
pub const MAX_AGE: i32 = 120;

/// Employee response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeResponse {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub user_name: String,
    pub email: String,
    pub age: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create employee payload
///
/// Absent fields deserialize to empty/zero and are then rejected by validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct EmployeeCreate {
    #[validate(
        custom(function = "not_blank", message = "is required"),
        length(max = 100, message = "must be at most 100 characters")
    )]
    pub first_name: String,
    #[validate(
        custom(function = "not_blank", message = "is required"),
        length(max = 100, message = "must be at most 100 characters")
    )]
    pub last_name: String,
    #[validate(
        custom(function = "not_blank", message = "is required"),
        length(max = 50, message = "must be at most 50 characters")
    )]
    pub user_name: String,
    #[validate(
        custom(function = "not_blank", message = "is required"),
        email(message = "must be a valid email address"),
        length(max = 255, message = "must be at most 255 characters")
    )]
    pub email: String,
    #[validate(range(min = 18, max = 120, message = "must be between 18 and 120"))]
    pub age: i32,
}

/// Update employee payload
///
/// Every field is optional; only supplied fields are validated.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 100, message = "must be at most 100 characters"))]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 100, message = "must be at most 100 characters"))]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 50, message = "must be at most 50 characters"))]
    pub user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(
        email(message = "must be a valid email address"),
        length(max = 255, message = "must be at most 255 characters")
    )]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 18, max = 120, message = "must be between 18 and 120"))]
    pub age: Option<i32>,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_create() -> EmployeeCreate {
        EmployeeCreate {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            user_name: "ada".into(),
            email: "ada@x.com".into(),
            age: 36,
        }
    }

    #[test]
    fn test_create_valid() {
        assert!(valid_create().validate().is_ok());
    }

    #[test]
    fn test_create_missing_fields_fail() {
        let payload: EmployeeCreate = serde_json::from_str(r#"{"firstName":"Ada"}"#).unwrap();
        let errors = payload.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("last_name"));
        assert!(fields.contains_key("user_name"));
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("age"));
        assert!(!fields.contains_key("first_name"));
    }

    #[test]
    fn test_create_whitespace_name_is_blank() {
        let mut payload = valid_create();
        payload.first_name = "   ".into();
        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("first_name"));
    }

    #[test]
    fn test_create_length_limits() {
        let mut payload = valid_create();
        payload.user_name = "u".repeat(MAX_USERNAME_LEN as usize);
        payload.first_name = "f".repeat(MAX_NAME_LEN as usize);
        assert!(payload.validate().is_ok());

        payload.user_name = "u".repeat(MAX_USERNAME_LEN as usize + 1);
        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("user_name"));
    }

    #[test]
    fn test_create_email_and_age() {
        let mut payload = valid_create();
        payload.email = "not-an-email".into();
        payload.age = MAX_AGE + 1;
        let errors = payload.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("age"));

        payload.email = "ada@x.com".into();
        payload.age = MIN_AGE;
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn test_update_absent_fields_skip_validation() {
        let payload: EmployeeUpdate = serde_json::from_str(r#"{"age":37}"#).unwrap();
        assert_eq!(payload.age, Some(37));
        assert!(payload.first_name.is_none());
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn test_update_supplied_fields_validated() {
        let payload = EmployeeUpdate {
            email: Some("broken".into()),
            age: Some(17),
            ..Default::default()
        };
        let errors = payload.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("age"));
    }

    #[test]
    fn test_update_empty_name_passes_boundary() {
        let payload = EmployeeUpdate {
            first_name: Some(String::new()),
            user_name: Some(String::new()),
            ..Default::default()
        };
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn test_response_uses_camel_case() {
        let now = Utc::now();
        let response = EmployeeResponse {
            id: 1,
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            user_name: "ada".into(),
            email: "ada@x.com".into(),
            age: 36,
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["firstName"], "Ada");
        assert_eq!(json["userName"], "ada");
        assert!(json.get("createdAt").is_some());
    }
}
