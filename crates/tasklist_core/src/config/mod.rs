use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "config.json";
const CONFIG_ENV_VAR: &str = "TASKLIST_CONFIG_PATH";

pub const DEFAULT_LOG_LEVEL: &str = "error";

/// Maps a user-supplied level onto a `tracing` level name.
pub fn canonical_log_level(raw: &str) -> Option<String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "trace" => Some("trace".to_string()),
        "debug" => Some("debug".to_string()),
        "info" => Some("info".to_string()),
        "warn" | "warning" => Some("warn".to_string()),
        "error" => Some("error".to_string()),
        "off" | "none" | "quiet" => Some("off".to_string()),
        _ => None,
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub store_path: Option<PathBuf>,
    #[serde(default)]
    pub log_level: Option<String>,
}

impl Config {
    pub fn log_level_or_default(&self) -> &str {
        self.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }
}

#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: Config,
    pub error: Option<AppError>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub store_path: Option<PathBuf>,
    pub log_level: Option<String>,
}

pub fn config_path() -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    let base = dirs::config_dir()
        .ok_or_else(|| AppError::invalid_data("no configuration directory for this platform"))?;
    Ok(base.join("tasklist").join(CONFIG_FILE_NAME))
}

/// Loads the config, falling back to defaults on any problem.
pub fn load_config_with_fallback() -> ConfigLoad {
    match config_path() {
        Ok(path) => load_config_with_fallback_from_path(&path),
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    }
}

fn load_config_with_fallback_from_path(path: &Path) -> ConfigLoad {
    if !path.exists() {
        return ConfigLoad {
            config: Config::default(),
            error: None,
        };
    }

    match load_config_from_path(path) {
        Ok(config) => ConfigLoad {
            config,
            error: None,
        },
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    }
}

fn load_config_from_path(path: &Path) -> Result<Config, AppError> {
    let content = std::fs::read_to_string(path)
        .map_err(|err| AppError::invalid_data(format!("{}: {}", path.display(), err)))?;
    let config: Config = serde_json::from_str(&content).map_err(|err| {
        AppError::invalid_data(format!("invalid JSON in {}: {}", path.display(), err))
    })?;
    normalize_config(config, path)
}

fn normalize_config(mut config: Config, path: &Path) -> Result<Config, AppError> {
    if let Some(level) = config.log_level.take() {
        let canonical = canonical_log_level(&level).ok_or_else(|| {
            AppError::invalid_data(format!(
                "unknown log_level '{level}' in {}",
                path.display()
            ))
        })?;
        config.log_level = Some(canonical);
    }

    if config
        .store_path
        .as_ref()
        .is_some_and(|store| store.as_os_str().is_empty())
    {
        config.store_path = None;
    }

    Ok(config)
}

pub fn merge_overrides(base: &Config, overrides: &ConfigOverrides) -> Config {
    let mut merged = base.clone();
    if let Some(store_path) = overrides.store_path.as_ref() {
        merged.store_path = Some(store_path.clone());
    }

    if let Some(level) = overrides.log_level.as_deref()
        && let Some(canonical) = canonical_log_level(level)
    {
        merged.log_level = Some(canonical);
    }

    merged
}
