use std::sync::Arc;

use crate::core::{Config, Result, ServerError};
use crate::db::{DbService, SqlUnitOfWorkFactory, UnitOfWorkFactory};
use crate::services::EmployeeService;

/// Server state shared by every handler
///
/// Cheap to clone: the config plus an `Arc` to the unit-of-work factory.
/// Nothing mutable lives here; every request builds its own unit of work.
///
/// | Field | Type | Meaning |
/// |-------|------|---------|
/// | config | Config | configuration (immutable) |
/// | unit_of_work | Arc<dyn UnitOfWorkFactory> | per-request unit of work source |
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub unit_of_work: Arc<dyn UnitOfWorkFactory>,
}

impl ServerState {
    /// Build from parts; tests pass an in-memory factory here
    pub fn new(config: Config, unit_of_work: Arc<dyn UnitOfWorkFactory>) -> Self {
        Self {
            config,
            unit_of_work,
        }
    }

    /// Initialize the server state
    ///
    /// In order:
    /// 1. work directory structure
    /// 2. database (pool + migrations)
    /// 3. unit-of-work factory over the pool
    pub async fn initialize(config: &Config) -> Result<Self> {
        config.ensure_work_dir_structure()?;

        let db_path = config.database_path();
        let db_path = db_path
            .to_str()
            .ok_or_else(|| ServerError::Config(format!("non UTF-8 database path: {db_path:?}")))?;
        let db = DbService::new(db_path, config.db_max_connections).await?;

        Ok(Self::new(
            config.clone(),
            Arc::new(SqlUnitOfWorkFactory::new(db.pool)),
        ))
    }

    /// Fresh service over a fresh unit of work, for one request
    pub fn employee_service(&self) -> EmployeeService {
        EmployeeService::new(self.unit_of_work.create())
    }
}
