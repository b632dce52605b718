use crate::errors::ConfigError;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const DEFAULT_BIND: &str = "127.0.0.1:5001";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum StorageBackend {
    #[default]
    FlatFile,
    Sqlite,
    Memory,
}

impl StorageBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageBackend::FlatFile => "csv",
            StorageBackend::Sqlite => "sqlite",
            StorageBackend::Memory => "memory",
        }
    }

    pub fn default_path(&self) -> Option<PathBuf> {
        match self {
            StorageBackend::FlatFile => Some(PathBuf::from("data/users.csv")),
            StorageBackend::Sqlite => Some(PathBuf::from("data/backyard.db")),
            StorageBackend::Memory => None,
        }
    }
}

impl FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" | "file" | "flat-file" | "flat_file" => Ok(StorageBackend::FlatFile),
            "sqlite" | "sqlite3" => Ok(StorageBackend::Sqlite),
            "memory" | "mem" => Ok(StorageBackend::Memory),
            other => Err(ConfigError(format!(
                "unknown storage backend '{}' (expected csv, sqlite or memory)",
                other
            ))),
        }
    }
}

impl TryFrom<String> for StorageBackend {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub path: Option<PathBuf>,
}

impl StorageConfig {
    pub fn new(backend: StorageBackend, path: Option<PathBuf>) -> Self {
        Self { backend, path }
    }

    pub fn memory() -> Self {
        Self::new(StorageBackend::Memory, None)
    }

    /// Explicit path, else the backend default. `None` only for the memory backend.
    pub fn resolved_path(&self) -> Option<PathBuf> {
        self.path.clone().or_else(|| self.backend.default_path())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub bind: String,
    pub storage: StorageConfig,
    pub maps_api_key: Option<String>,
    pub report_seed: Option<u64>,
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            storage: StorageConfig::default(),
            maps_api_key: None,
            report_seed: None,
            log_level: "info".to_string(),
        }
    }
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut cfg = Self::default();
        cfg.apply_env()?;
        Ok(cfg)
    }

    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_vars(|key| std::env::var(key).ok())
    }

    /// Overlay `BACKYARD_*` variables. Empty values count as unset.
    pub fn apply_vars<F>(&mut self, var: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| var(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = var("BACKYARD_BIND") {
            self.bind = v;
        }
        if let Some(v) = var("BACKYARD_STORAGE") {
            self.storage.backend = v.parse()?;
        }
        if let Some(v) = var("BACKYARD_DATA_PATH") {
            self.storage.path = Some(PathBuf::from(v));
        }
        if let Some(v) = var("BACKYARD_MAPS_API_KEY") {
            self.maps_api_key = Some(v);
        }
        if let Some(v) = var("BACKYARD_REPORT_SEED") {
            let seed = v
                .trim()
                .parse()
                .map_err(|_| ConfigError(format!("BACKYARD_REPORT_SEED is not a u64: {}", v)))?;
            self.report_seed = Some(seed);
        }
        if let Some(v) = var("BACKYARD_LOG") {
            self.log_level = v;
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    bind: Option<String>,
    storage: Option<StorageBackend>,
    data_path: Option<PathBuf>,
    maps_api_key: Option<String>,
    report_seed: Option<u64>,
    log_level: Option<String>,
}

/// Load a YAML service config. Unknown keys are reported and ignored.
pub fn load_config(path: &Path) -> Result<ServiceConfig, ConfigError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| ConfigError(format!("failed to read config {}: {}", path.display(), e)))?;
    parse_config(&raw, path)
}

fn parse_config(raw: &str, path: &Path) -> Result<ServiceConfig, ConfigError> {
    let mut ignored_keys = Vec::new();
    let deserializer = serde_yaml::Deserializer::from_str(raw);
    let file: ConfigFile = serde_ignored::deserialize(deserializer, |p| {
        ignored_keys.push(p.to_string());
    })
    .map_err(|e| ConfigError(format!("failed to parse YAML {}: {}", path.display(), e)))?;

    if !ignored_keys.is_empty() {
        tracing::warn!(
            config = %path.display(),
            keys = ?ignored_keys,
            "ignored unknown config fields"
        );
    }

    let mut cfg = ServiceConfig::default();
    if let Some(v) = file.bind {
        cfg.bind = v;
    }
    if let Some(v) = file.storage {
        cfg.storage.backend = v;
    }
    cfg.storage.path = file.data_path;
    cfg.maps_api_key = file.maps_api_key;
    cfg.report_seed = file.report_seed;
    if let Some(v) = file.log_level {
        cfg.log_level = v;
    }
    Ok(cfg)
}
