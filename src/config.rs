//! Process configuration
//!
//! Built once in `main` from the environment (after `.env` is loaded) and
//! passed by reference to whatever needs it.

use std::path::PathBuf;

/// Default server name reported during `initialize`
pub const DEFAULT_SERVER_NAME: &str = "ABC Pizza MCP Server";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{key} must be a number, got '{value}'")]
    InvalidNumber { key: &'static str, value: String },

    #[error("{key} is invalid: {reason}")]
    Invalid { key: &'static str, reason: String },

    #[error("failed to prepare data directory: {0}")]
    DataDir(#[from] std::io::Error),
}

/// Output format for the tracing subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// `sqlx` connection string, e.g. `sqlite:///var/lib/pizza.db`
    pub url: String,
    pub min_pool_size: u32,
    pub max_pool_size: u32,
    pub acquire_timeout_secs: u64,
    pub busy_timeout_ms: u64,
}

impl DatabaseConfig {
    /// Config for a database file at `path` with default pool bounds
    pub fn for_path(path: impl Into<PathBuf>) -> Self {
        Self {
            url: format!("sqlite://{}", path.into().display()),
            ..Self::default()
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://.abc-pizza/pizza.db".to_string(),
            min_pool_size: 5,
            max_pool_size: 20,
            acquire_timeout_secs: 30,
            busy_timeout_ms: 5_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub name: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_SERVER_NAME.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub log_format: LogFormat,
}

impl AppConfig {
    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary key lookup
    ///
    /// Recognized keys: `DATABASE_URL`, `DB_MIN_POOL_SIZE`, `DB_MAX_POOL_SIZE`,
    /// `DB_ACQUIRE_TIMEOUT_SECS`, `DB_BUSY_TIMEOUT_MS`, `MCP_SERVER_NAME`,
    /// `LOG_FORMAT`. Missing or blank keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = DatabaseConfig::default();

        let database = DatabaseConfig {
            url: get("DATABASE_URL").unwrap_or(defaults.url),
            min_pool_size: number(&get, "DB_MIN_POOL_SIZE", defaults.min_pool_size)?,
            max_pool_size: number(&get, "DB_MAX_POOL_SIZE", defaults.max_pool_size)?,
            acquire_timeout_secs: number(
                &get,
                "DB_ACQUIRE_TIMEOUT_SECS",
                defaults.acquire_timeout_secs,
            )?,
            busy_timeout_ms: number(&get, "DB_BUSY_TIMEOUT_MS", defaults.busy_timeout_ms)?,
        };

        if database.max_pool_size == 0 || database.min_pool_size > database.max_pool_size {
            return Err(ConfigError::Invalid {
                key: "DB_MAX_POOL_SIZE",
                reason: format!(
                    "pool bounds must satisfy 0 < min <= max (min={}, max={})",
                    database.min_pool_size, database.max_pool_size
                ),
            });
        }

        let server = ServerConfig {
            name: get("MCP_SERVER_NAME").unwrap_or_else(|| DEFAULT_SERVER_NAME.to_string()),
        };

        let log_format = match get("LOG_FORMAT") {
            Some(raw) => raw.parse().map_err(|reason| ConfigError::Invalid {
                key: "LOG_FORMAT",
                reason,
            })?,
            None => LogFormat::default(),
        };

        Ok(Self {
            database,
            server,
            log_format,
        })
    }
}

fn number<T, G>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { key, value: raw }),
        None => Ok(default),
    }
}

/// Data directory used when no `DATABASE_URL` is configured
pub fn data_dir() -> std::io::Result<PathBuf> {
    Ok(std::env::current_dir()?.join(".abc-pizza"))
}

/// Make sure the default data directory exists
pub fn init_data_dir() -> Result<PathBuf, ConfigError> {
    let dir = data_dir()?;
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
