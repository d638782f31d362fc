//! Service layer
//!
//! # Services
//!
//! - [`EmployeeService`] - employee business rules over a [`UnitOfWork`](crate::db::UnitOfWork)

pub mod employee_service;

pub use employee_service::{EmployeeService, ServiceError, ServiceResult};
