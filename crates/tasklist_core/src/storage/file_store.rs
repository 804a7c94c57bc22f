use super::KeyValueStorage;
use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const SCHEMA_VERSION: u32 = 1;
const STORE_FILE_NAME: &str = "storage.json";
const STORE_ENV_VAR: &str = "TASKLIST_STORE_PATH";

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredEntries {
    schema_version: u32,
    #[serde(default)]
    entries: BTreeMap<String, String>,
}

/// Resolves the storage file: env var, then the configured path, then the
/// platform config directory.
pub fn store_path(configured: Option<&Path>) -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(STORE_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    if let Some(path) = configured {
        return Ok(path.to_path_buf());
    }

    let base = dirs::config_dir()
        .ok_or_else(|| AppError::invalid_data("no configuration directory for this platform"))?;
    Ok(base.join("tasklist").join(STORE_FILE_NAME))
}

/// Key-value storage kept as one JSON document on disk.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_entries(&self) -> Result<StoredEntries, AppError> {
        if !self.path.exists() {
            return Ok(StoredEntries {
                schema_version: SCHEMA_VERSION,
                entries: BTreeMap::new(),
            });
        }

        let content = std::fs::read_to_string(&self.path).map_err(|err| {
            AppError::storage_unavailable(format!("{}: {}", self.path.display(), err))
        })?;
        let stored: StoredEntries = serde_json::from_str(&content).map_err(|err| {
            AppError::storage_unavailable(format!(
                "corrupt storage document {}: {}",
                self.path.display(),
                err
            ))
        })?;

        if !(1..=SCHEMA_VERSION).contains(&stored.schema_version) {
            return Err(AppError::storage_unavailable("schema_version mismatch"));
        }

        Ok(stored)
    }

    fn save_entries(&self, stored: &StoredEntries) -> Result<(), AppError> {
        let io_err = |err: std::io::Error| {
            AppError::storage_unavailable(format!("{}: {}", self.path.display(), err))
        };

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }

        let content = serde_json::to_string_pretty(stored)
            .map_err(|err| AppError::invalid_data(err.to_string()))?;
        std::fs::write(&self.path, content).map_err(io_err)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&self.path, permissions).map_err(io_err)?;
        }

        Ok(())
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        Ok(self.load_entries()?.entries.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        let mut stored = self.load_entries()?;
        stored.schema_version = SCHEMA_VERSION;
        stored.entries.insert(key.to_string(), value.to_string());
        self.save_entries(&stored)
    }
}
