use thiserror::Error;

use crate::db::RepoError;

/// Startup and serve errors
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database initialization failed: {0}")]
    Database(#[from] RepoError),

    #[error("Server error: {0}")]
    Serve(String),
}

pub type Result<T> = std::result::Result<T, ServerError>;
