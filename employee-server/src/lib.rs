//! Employee Server - employee records over HTTP
//!
//! # Architecture
//!
//! Requests flow through four layers, each behind a trait so the store can
//! be swapped for the in-memory fake in tests:
//!
//! - **HTTP API** (`api`): axum routes, request validation, error mapping
//! - **Services** (`services`): business rules (uniqueness, partial update)
//! - **Unit of Work** (`db::unit_of_work`): save / transaction boundary
//! - **Repository** (`db::repository`): sqlx queries over SQLite
//!
//! # Layout
//!
//! ```text
//! employee-server/src/
//! ├── core/          # config, state, server, startup errors
//! ├── api/           # routes, extractors, handlers
//! ├── services/      # employee service
//! ├── db/            # pool, migrations, repository, unit of work, memory store
//! └── utils/         # logging, error re-exports
//! ```

pub mod api;
pub mod core;
pub mod db;
pub mod services;
pub mod utils;

pub use crate::core::{Config, Server, ServerState};
pub use services::EmployeeService;
pub use utils::logger::init_logger_with_file;
pub use utils::{AppError, AppResult, ErrorCode};

/// Load `.env`, then set up logging from the environment
///
/// Returns the loaded configuration.
pub fn setup_environment() -> Config {
    // Missing .env is fine
    let _ = dotenvy::dotenv();

    let config = Config::from_env();
    if let Err(e) = config.ensure_work_dir_structure() {
        eprintln!("Failed to create work directory {}: {e}", config.work_dir);
    }
    init_logger_with_file(
        Some(&config.log_level),
        config.is_production(),
        config.log_dir.as_deref(),
    );
    config
}
