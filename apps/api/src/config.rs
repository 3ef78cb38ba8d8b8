//! # Server Configuration
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`MEDPOS_*`)
//! 2. TOML file named by `MEDPOS_CONFIG`
//! 3. Defaults (this file)
//!
//! Read once at startup; nothing mutates it afterwards.

use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use medpos_core::DEFAULT_IDEMPOTENCY_TTL_SECS;
use medpos_db::DbConfig;

/// Environment variable naming the optional TOML file.
pub const CONFIG_FILE_VAR: &str = "MEDPOS_CONFIG";

/// Server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address
    pub bind_addr: SocketAddr,

    /// SQLite database file
    pub database_path: PathBuf,

    pub db_max_connections: u32,

    /// How long an idempotency key blocks resubmission
    pub idempotency_ttl_secs: u64,

    /// How often expired idempotency keys are purged
    pub idempotency_sweep_secs: u64,

    /// Fallback tracing filter when `RUST_LOG` is unset
    pub log: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            database_path: PathBuf::from("./medpos.db"),
            db_max_connections: 5,
            idempotency_ttl_secs: DEFAULT_IDEMPOTENCY_TTL_SECS,
            idempotency_sweep_secs: 30,
            log: "info,medpos=debug".to_string(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(|key| env::var(key).ok())
    }

    /// Load configuration using `lookup` in place of the process environment.
    pub fn load_from(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = match lookup(CONFIG_FILE_VAR) {
            Some(path) => Self::from_file(&path)?,
            None => ServerConfig::default(),
        };

        if let Some(v) = lookup("MEDPOS_BIND_ADDR") {
            config.bind_addr = parse_var("MEDPOS_BIND_ADDR", &v)?;
        }
        if let Some(v) = lookup("MEDPOS_DATABASE_PATH") {
            config.database_path = PathBuf::from(v);
        }
        if let Some(v) = lookup("MEDPOS_DB_MAX_CONNECTIONS") {
            config.db_max_connections = parse_var("MEDPOS_DB_MAX_CONNECTIONS", &v)?;
        }
        if let Some(v) = lookup("MEDPOS_IDEMPOTENCY_TTL_SECS") {
            config.idempotency_ttl_secs = parse_var("MEDPOS_IDEMPOTENCY_TTL_SECS", &v)?;
        }
        if let Some(v) = lookup("MEDPOS_IDEMPOTENCY_SWEEP_SECS") {
            config.idempotency_sweep_secs = parse_var("MEDPOS_IDEMPOTENCY_SWEEP_SECS", &v)?;
        }
        if let Some(v) = lookup("MEDPOS_LOG") {
            config.log = v;
        }

        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue("MEDPOS_DB_MAX_CONNECTIONS".to_string()));
        }
        if self.idempotency_ttl_secs == 0 {
            return Err(ConfigError::InvalidValue("MEDPOS_IDEMPOTENCY_TTL_SECS".to_string()));
        }
        if self.idempotency_sweep_secs == 0 {
            return Err(ConfigError::InvalidValue("MEDPOS_IDEMPOTENCY_SWEEP_SECS".to_string()));
        }
        Ok(())
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database_path).max_connections(self.db_max_connections)
    }

    pub fn idempotency_ttl(&self) -> Duration {
        Duration::from_secs(self.idempotency_ttl_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.idempotency_sweep_secs)
    }
}

fn parse_var<T: FromStr>(name: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue(name.to_string()))
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Cannot read config file {path}: {message}")]
    Io { path: String, message: String },

    #[error("Invalid config file: {0}")]
    Parse(String),
}
