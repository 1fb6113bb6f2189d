use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Runtime configuration. Resolution order: built-in defaults, then an
/// optional TOML file, then `FLOWBUILDER_*` environment variables. CLI flags
/// are applied last by the binary.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// SQLite file path, or `:memory:`.
    pub database: String,
    pub log_level: String,
    /// Language enabled on every newly created project.
    pub default_language_code: String,
    pub pool: PoolConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    pub idle_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: "flowbuilder.db".to_string(),
            log_level: "info".to_string(),
            default_language_code: "en".to_string(),
            pool: PoolConfig::default(),
        }
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        // SQLite serialises writers, more connections stop paying off early
        Self {
            max_connections: 20,
            min_connections: 1,
            connect_timeout_secs: 5,
            idle_timeout_secs: 300,
        }
    }
}

impl PoolConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }
}

impl AppConfig {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        Ok(config.with_env())
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn from_env() -> Self {
        Self::default().with_env()
    }

    fn with_env(mut self) -> Self {
        if let Ok(database) = std::env::var("FLOWBUILDER_DATABASE") {
            self.database = database;
        }
        if let Ok(level) = std::env::var("FLOWBUILDER_LOG") {
            self.log_level = level;
        }
        if let Ok(code) = std::env::var("FLOWBUILDER_DEFAULT_LANGUAGE") {
            self.default_language_code = code;
        }
        if let Some(max) = std::env::var("FLOWBUILDER_MAX_CONNECTIONS")
            .ok()
            .and_then(|value| value.parse().ok())
        {
            self.pool.max_connections = max;
        }
        self
    }
}
