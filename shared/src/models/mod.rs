//! Data models
//!
//! Request and response shapes of the HTTP API.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY).

pub mod employee;

// Re-exports
pub use employee::*;
