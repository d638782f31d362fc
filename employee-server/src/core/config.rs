use std::path::PathBuf;

/// Server configuration
///
/// # Environment variables
///
/// Every setting can be overridden from the environment (a `.env` file is
/// loaded first by the binary):
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | WORK_DIR | ./data | work directory (database, logs) |
/// | DATABASE_PATH | WORK_DIR/database/employees.db | SQLite file |
/// | DB_MAX_CONNECTIONS | 5 | pool size |
/// | HTTP_PORT | 8080 | HTTP port |
/// | ENVIRONMENT | development | development / staging / production |
/// | LOG_LEVEL | info | default filter when RUST_LOG is unset |
/// | LOG_DIR | (unset) | daily rolling log file directory |
///
/// # Example
///
/// ```ignore
/// WORK_DIR=/srv/employees HTTP_PORT=9000 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Work directory holding the database and log files
    pub work_dir: String,
    /// Explicit database file; derived from `work_dir` when unset
    pub database_path: Option<String>,
    pub db_max_connections: u32,
    pub http_port: u16,
    /// development | staging | production
    pub environment: String,
    pub log_level: String,
    pub log_dir: Option<String>,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    /// Load from the environment, falling back to defaults
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into()),
            database_path: env_opt("DATABASE_PATH"),
            db_max_connections: env_or("DB_MAX_CONNECTIONS", 5),
            http_port: env_or("HTTP_PORT", 8080),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: env_opt("LOG_DIR"),
        }
    }

    /// Override the work directory and port
    ///
    /// Used by tests; the database moves into the new work directory.
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.database_path = None;
        config.http_port = http_port;
        config
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn database_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("database")
    }

    /// SQLite database file
    pub fn database_path(&self) -> PathBuf {
        match &self.database_path {
            Some(path) => PathBuf::from(path),
            None => self.database_dir().join("employees.db"),
        }
    }

    /// Create the work directory and the database / log directories
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.work_dir)?;
        if let Some(parent) = self.database_path().parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        if let Some(log_dir) = &self.log_dir {
            std::fs::create_dir_all(log_dir)?;
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
