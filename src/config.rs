//! Runtime settings for the binaries.
//!
//! Built from defaults, then an optional JSON file, then `PLAN_IT_*` environment
//! variables:
//!
//! - `PLAN_IT_HTTP_ADDR`: listen address for the HTTP API (`0.0.0.0:3000`)
//! - `PLAN_IT_LOG_LEVEL`: `trace|debug|info|warn|error|off` (`info`)
//! - `PLAN_IT_LOG_DIR`: rotating log directory; unset logs to stderr
//! - `PLAN_IT_STORE`: `json:<path>` | `csv:<path>` | `sqlite:<path>` | `memory`

use crate::persistence::{CsvFileStore, JsonFileStore, MemoryStore, PersistenceResult, TaskStore};
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const ENV_HTTP_ADDR: &str = "PLAN_IT_HTTP_ADDR";
pub const ENV_LOG_LEVEL: &str = "PLAN_IT_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "PLAN_IT_LOG_DIR";
pub const ENV_STORE: &str = "PLAN_IT_STORE";

const DEFAULT_STORE_PATH: &str = "plan-it.json";

#[derive(Debug)]
pub enum ConfigError {
    Io(io::Error),
    Parse(serde_json::Error),
    InvalidAddress(String),
    InvalidLogLevel(String),
    InvalidStore(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "failed to read config: {err}"),
            ConfigError::Parse(err) => write!(f, "invalid config file: {err}"),
            ConfigError::InvalidAddress(value) => write!(f, "invalid http address `{value}`"),
            ConfigError::InvalidLogLevel(value) => write!(f, "invalid log level `{value}`"),
            ConfigError::InvalidStore(value) => write!(
                f,
                "invalid store `{value}`; expected json:<path>, csv:<path>, sqlite:<path> or memory"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<io::Error> for ConfigError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// Where the project snapshot is kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum StoreConfig {
    Json(PathBuf),
    Csv(PathBuf),
    Sqlite(PathBuf),
    Memory,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::Json(PathBuf::from(DEFAULT_STORE_PATH))
    }
}

impl FromStr for StoreConfig {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.eq_ignore_ascii_case("memory") {
            return Ok(StoreConfig::Memory);
        }
        let (kind, path) = trimmed
            .split_once(':')
            .ok_or_else(|| ConfigError::InvalidStore(value.to_string()))?;
        let path = path.trim();
        if path.is_empty() {
            return Err(ConfigError::InvalidStore(value.to_string()));
        }
        match kind.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(StoreConfig::Json(PathBuf::from(path))),
            "csv" => Ok(StoreConfig::Csv(PathBuf::from(path))),
            "sqlite" if cfg!(feature = "sqlite") => Ok(StoreConfig::Sqlite(PathBuf::from(path))),
            _ => Err(ConfigError::InvalidStore(value.to_string())),
        }
    }
}

impl TryFrom<String> for StoreConfig {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<StoreConfig> for String {
    fn from(value: StoreConfig) -> Self {
        value.to_string()
    }
}

impl fmt::Display for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreConfig::Json(path) => write!(f, "json:{}", path.display()),
            StoreConfig::Csv(path) => write!(f, "csv:{}", path.display()),
            StoreConfig::Sqlite(path) => write!(f, "sqlite:{}", path.display()),
            StoreConfig::Memory => write!(f, "memory"),
        }
    }
}

impl StoreConfig {
    pub fn open(&self) -> PersistenceResult<Box<dyn TaskStore + Send + Sync>> {
        match self {
            StoreConfig::Json(path) => Ok(Box::new(JsonFileStore::new(path.clone()))),
            StoreConfig::Csv(path) => Ok(Box::new(CsvFileStore::new(path.clone()))),
            #[cfg(feature = "sqlite")]
            StoreConfig::Sqlite(path) => Ok(Box::new(
                crate::persistence::sqlite::SqliteTaskStore::new(path)?,
            )),
            #[cfg(not(feature = "sqlite"))]
            StoreConfig::Sqlite(path) => Err(crate::persistence::PersistenceError::InvalidData(format!(
                "sqlite store {} requires the `sqlite` feature",
                path.display()
            ))),
            StoreConfig::Memory => Ok(Box::new(MemoryStore::new())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub http_addr: SocketAddr,
    pub log_level: String,
    pub log_dir: Option<PathBuf>,
    pub store: StoreConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            http_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            log_level: "info".to_string(),
            log_dir: None,
            store: StoreConfig::default(),
        }
    }
}

impl AppConfig {
    /// Defaults, overlaid by `path` when given, then by the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.with_env(|key| std::env::var(key).ok())
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Applies `PLAN_IT_*` overrides read through `lookup`.
    pub fn with_env<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup(ENV_HTTP_ADDR) {
            self.http_addr = addr
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidAddress(addr.clone()))?;
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.log_level = level.trim().to_string();
        }
        if let Some(dir) = lookup(ENV_LOG_DIR) {
            let dir = dir.trim();
            self.log_dir = (!dir.is_empty()).then(|| PathBuf::from(dir));
        }
        if let Some(store) = lookup(ENV_STORE) {
            self.store = store.parse()?;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        LevelFilter::from_str(self.log_level.trim())
            .map_err(|_| ConfigError::InvalidLogLevel(self.log_level.clone()))?;
        Ok(())
    }

    pub fn log_dir_str(&self) -> Option<String> {
        self.log_dir.as_ref().map(|dir| dir.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_documented_values() {
        let config = AppConfig::default();
        assert_eq!(config.http_addr.to_string(), "0.0.0.0:3000");
        assert_eq!(config.store, StoreConfig::Json(PathBuf::from("plan-it.json")));
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = AppConfig::default()
            .with_env(env(&[
                (ENV_HTTP_ADDR, "127.0.0.1:8080"),
                (ENV_LOG_LEVEL, "debug"),
                (ENV_STORE, "memory"),
            ]))
            .unwrap();
        assert_eq!(config.http_addr.port(), 8080);
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.store, StoreConfig::Memory);
    }

    #[test]
    fn bad_values_are_reported() {
        let err = AppConfig::default()
            .with_env(env(&[(ENV_HTTP_ADDR, "nowhere")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidAddress(_)));

        let err = AppConfig::default()
            .with_env(env(&[(ENV_LOG_LEVEL, "chatty")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidLogLevel(_)));

        assert!("yaml:plan.yml".parse::<StoreConfig>().is_err());
        assert!("json:".parse::<StoreConfig>().is_err());
    }

    #[test]
    fn file_settings_fill_missing_fields_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"store":"csv:tasks.csv","log_level":"warn"}"#).unwrap();
        let config = AppConfig::from_file(&path).unwrap();
        assert_eq!(config.store, StoreConfig::Csv(PathBuf::from("tasks.csv")));
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.http_addr, AppConfig::default().http_addr);
    }
}
