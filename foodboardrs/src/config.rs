//! Configuration for the dashboard.
//!
//! TOML-based; every field has a default so an empty file (or no file at all)
//! yields a working configuration pointing at `food_wastage.db`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{FoodboardError, Result};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "FOODBOARD_CONFIG";
/// Environment variable overriding `store.path` after the config is loaded.
pub const DB_PATH_ENV: &str = "FOODBOARD_DB";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct FoodboardConfig {
    pub store: StoreConfig,
    pub dashboard: DashboardConfig,
    pub logging: LoggingConfig,
}

/// Which embedded engine backs the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Duckdb,
    Sqlite,
}

/// Location of the relational store.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Engine used to open `path` (default: duckdb).
    pub backend: BackendKind,
    /// Database file (default: `food_wastage.db`).
    pub path: PathBuf,
}

/// Static page text.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub title: String,
    pub caption: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Duckdb,
            path: PathBuf::from("food_wastage.db"),
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            title: "Local Food Wastage Management Dashboard".to_string(),
            caption: "Tip: Use the filters in the sidebar to refine the dashboard.".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

impl FoodboardConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| FoodboardError::Config(format!("failed to read config file: {e}")))?;
        Self::from_toml(&contents)
    }

    /// Load configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str)
            .map_err(|e| FoodboardError::Config(format!("failed to parse config: {e}")))
    }

    /// Load from default locations (env var, cwd, user config dir, or defaults).
    ///
    /// Search order:
    /// 1. `FOODBOARD_CONFIG` environment variable
    /// 2. `./foodboard.toml` (current directory)
    /// 3. `~/.config/foodboard/config.toml` (user config dir)
    /// 4. Built-in defaults
    ///
    /// `FOODBOARD_DB`, when set, replaces `store.path` in whichever config won.
    pub fn load_default() -> Self {
        let mut cfg = Self::discover();
        if let Ok(path) = std::env::var(DB_PATH_ENV) {
            tracing::info!(path = %path, "store path overridden by {DB_PATH_ENV}");
            cfg.store.path = PathBuf::from(path);
        }
        cfg
    }

    fn discover() -> Self {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            match Self::from_file(&path) {
                Ok(cfg) => {
                    tracing::info!(path = %path, "loaded config from {CONFIG_ENV}");
                    return cfg;
                }
                Err(e) => tracing::warn!(path = %path, error = %e, "ignoring unreadable config"),
            }
        }

        if let Ok(cfg) = Self::from_file("foodboard.toml") {
            tracing::info!("loaded config from ./foodboard.toml");
            return cfg;
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("foodboard").join("config.toml");
            if let Ok(cfg) = Self::from_file(&user_config) {
                tracing::info!(path = %user_config.display(), "loaded config from user config dir");
                return cfg;
            }
        }

        tracing::debug!("no config file found, using defaults");
        Self::default()
    }
}
