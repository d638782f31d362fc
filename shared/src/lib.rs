//! Shared types for the employee service
//!
//! Wire types used by the server and its clients: the error system and the
//! employee request/response shapes.

pub mod error;
pub mod models;

// Re-exports
pub use error::{AppError, AppResult, ErrorCode};
pub use serde::{Deserialize, Serialize};
