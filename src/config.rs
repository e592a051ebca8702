use anyhow::{ensure, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::nutrition::aggregate::MAX_WINDOW_DAYS;

const MAX_RETENTION_DAYS: i64 = 36_500;
const MAX_TTL_DAYS: i64 = 3_650;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct LarderConfig {
    pub log: LogConfig,
    pub storage: StorageConfig,
    pub nutrition: NutritionConfig,
    pub cache: CacheConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: String,
    /// Largest serialized value accepted for a single key.
    pub max_value_bytes: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct NutritionConfig {
    pub retention_days: i64,
    pub week_length_days: u32,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_days: i64,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let db_path = default_larder_dir()
            .join("larder.db")
            .to_string_lossy()
            .into_owned();
        Self {
            db_path,
            max_value_bytes: 5 * 1024 * 1024,
        }
    }
}

impl Default for NutritionConfig {
    fn default() -> Self {
        Self {
            retention_days: crate::nutrition::retention::DEFAULT_RETENTION_DAYS,
            week_length_days: 7,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_days: crate::cache::DEFAULT_TTL_DAYS,
        }
    }
}

/// Returns `~/.larder/`, or `./.larder/` when no home directory is known.
pub fn default_larder_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".larder")
}

/// Returns the default config file path: `~/.larder/config.toml`
pub fn default_config_path() -> PathBuf {
    default_larder_dir().join("config.toml")
}

impl LarderConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            LarderConfig::default()
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Reject values outside the ranges the stores can work with.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            (1..=MAX_RETENTION_DAYS).contains(&self.nutrition.retention_days),
            "nutrition.retention_days must be between 1 and {MAX_RETENTION_DAYS}, got {}",
            self.nutrition.retention_days
        );
        ensure!(
            (1..=MAX_WINDOW_DAYS).contains(&self.nutrition.week_length_days),
            "nutrition.week_length_days must be between 1 and {MAX_WINDOW_DAYS}, got {}",
            self.nutrition.week_length_days
        );
        ensure!(
            (1..=MAX_TTL_DAYS).contains(&self.cache.ttl_days),
            "cache.ttl_days must be between 1 and {MAX_TTL_DAYS}, got {}",
            self.cache.ttl_days
        );
        ensure!(
            self.storage.max_value_bytes > 0,
            "storage.max_value_bytes must be positive"
        );
        Ok(())
    }

    /// Apply environment variable overrides (LARDER_DB, LARDER_LOG_LEVEL).
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("LARDER_DB") {
            self.storage.db_path = val;
        }
        if let Ok(val) = std::env::var("LARDER_LOG_LEVEL") {
            self.log.level = val;
        }
    }

    /// Resolve the database path, expanding `~` if needed.
    pub fn resolved_db_path(&self) -> PathBuf {
        expand_tilde(&self.storage.db_path)
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}
