//! Utilities
//!
//! - [`AppError`] / [`AppResult`] - HTTP error type (from shared::error)
//! - logging setup

pub mod logger;

pub use shared::error::{AppError, AppResult, ErrorCode, ErrorResponse};
