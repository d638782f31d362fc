//! Database Models

pub mod employee;

pub use employee::{Employee, EmployeeId, UniqueField};
