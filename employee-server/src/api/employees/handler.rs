//! Employee API Handlers

use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
};
use shared::models::{EmployeeCreate, EmployeeResponse, EmployeeUpdate};

use crate::api::error::service_error;
use crate::api::extract::{IdPath, ValidatedJson};
use crate::core::ServerState;
use crate::utils::{AppError, AppResult};

/// List all employees
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<EmployeeResponse>>> {
    let employees = state
        .employee_service()
        .list_all()
        .await
        .map_err(|e| service_error(e, "retrieving all employees"))?;
    Ok(Json(employees))
}

/// Get employee by id
pub async fn get_by_id(
    State(state): State<ServerState>,
    IdPath(id): IdPath,
) -> AppResult<Json<EmployeeResponse>> {
    let employee = state
        .employee_service()
        .get_by_id(id)
        .await
        .map_err(|e| service_error(e, format_args!("retrieving employee with ID {id}")))?
        .ok_or_else(|| AppError::employee_not_found(id))?;
    Ok(Json(employee))
}

/// Create a new employee
pub async fn create(
    State(state): State<ServerState>,
    ValidatedJson(payload): ValidatedJson<EmployeeCreate>,
) -> AppResult<impl IntoResponse> {
    let employee = state
        .employee_service()
        .create(payload)
        .await
        .map_err(|e| service_error(e, "creating employee"))?;

    let location = format!("/api/employees/{}", employee.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(employee),
    ))
}

/// Update an employee
pub async fn update(
    State(state): State<ServerState>,
    IdPath(id): IdPath,
    ValidatedJson(payload): ValidatedJson<EmployeeUpdate>,
) -> AppResult<Json<EmployeeResponse>> {
    let employee = state
        .employee_service()
        .update(id, payload)
        .await
        .map_err(|e| service_error(e, format_args!("updating employee with ID {id}")))?
        .ok_or_else(|| AppError::employee_not_found(id))?;
    Ok(Json(employee))
}

/// Delete an employee
pub async fn delete(
    State(state): State<ServerState>,
    IdPath(id): IdPath,
) -> AppResult<StatusCode> {
    let deleted = state
        .employee_service()
        .delete(id)
        .await
        .map_err(|e| service_error(e, format_args!("deleting employee with ID {id}")))?;
    if !deleted {
        return Err(AppError::employee_not_found(id));
    }
    Ok(StatusCode::NO_CONTENT)
}
