//! Server configuration read from the process environment.
//!
//! | Variable | Default |
//! |---|---|
//! | `ORGCHART_BIND_ADDR` | `0.0.0.0:8080` |
//! | `ORGCHART_DB_PATH` | `orgchart.sqlite3` |
//! | `ORGCHART_LOG_LEVEL` | `debug` in debug builds, `info` otherwise |
//! | `ORGCHART_LOG_DIR` | unset: log to stderr |
//!
//! Blank values are treated as unset.

use orgchart_core::{default_log_level, LogTarget, LoggingError};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::net::{AddrParseError, SocketAddr};
use std::path::PathBuf;

pub const BIND_ADDR_VAR: &str = "ORGCHART_BIND_ADDR";
pub const DB_PATH_VAR: &str = "ORGCHART_DB_PATH";
pub const LOG_LEVEL_VAR: &str = "ORGCHART_LOG_LEVEL";
pub const LOG_DIR_VAR: &str = "ORGCHART_LOG_DIR";

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_DB_PATH: &str = "orgchart.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub db_path: PathBuf,
    pub log_level: String,
    pub log_target: LogTarget,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidBindAddr {
        value: String,
        source: AddrParseError,
    },
    InvalidLogDir(LoggingError),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidBindAddr { value, source } => {
                write!(f, "invalid {BIND_ADDR_VAR} `{value}`: {source}")
            }
            Self::InvalidLogDir(err) => write!(f, "invalid {LOG_DIR_VAR}: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidBindAddr { source, .. } => Some(source),
            Self::InvalidLogDir(err) => Some(err),
        }
    }
}

impl ServerConfig {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`, one call per variable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let raw_addr = read(BIND_ADDR_VAR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = raw_addr
            .parse::<SocketAddr>()
            .map_err(|source| ConfigError::InvalidBindAddr {
                value: raw_addr.clone(),
                source,
            })?;

        Ok(Self {
            bind_addr,
            db_path: PathBuf::from(
                read(DB_PATH_VAR).unwrap_or_else(|| DEFAULT_DB_PATH.to_string()),
            ),
            log_level: read(LOG_LEVEL_VAR).unwrap_or_else(|| default_log_level().to_string()),
            log_target: LogTarget::from_dir(read(LOG_DIR_VAR).as_deref())
                .map_err(ConfigError::InvalidLogDir)?,
        })
    }
}
