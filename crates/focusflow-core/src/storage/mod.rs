//! Local persisted state.
//!
//! Four independent JSON blobs (`timer.json`, `profile.json`,
//! `settings.json`, `tasks.json`) plus the opaque client id. Loads fall
//! back to defaults on missing or corrupt data - a bad blob never reaches
//! the caller as an error. Saves write a temp file and rename so a crash
//! mid-write cannot corrupt the previous blob.

mod client_id;

pub use client_id::{get_or_create_client_id, get_or_create_client_id_at};

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::StorageError;

pub const TIMER_FILE: &str = "timer.json";
pub const PROFILE_FILE: &str = "profile.json";
pub const SETTINGS_FILE: &str = "settings.json";
pub const TASKS_FILE: &str = "tasks.json";

/// Returns `~/.config/focusflow[-dev]/` based on FOCUSFLOW_ENV.
///
/// Set FOCUSFLOW_ENV=dev to use a separate development data directory.
///
/// # Errors
/// Returns an error if the directory cannot be created.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("FOCUSFLOW_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("focusflow-dev")
    } else {
        base_dir.join("focusflow")
    };

    std::fs::create_dir_all(&dir).map_err(|source| StorageError::OpenFailed {
        path: dir.clone(),
        source,
    })?;
    Ok(dir)
}

/// Handle to the blob directory. Owns no state beyond the path; each
/// load/save touches disk.
#[derive(Debug, Clone)]
pub struct LocalStore {
    dir: PathBuf,
}

impl LocalStore {
    /// Open the default data directory.
    pub fn open() -> Result<Self, StorageError> {
        Ok(Self { dir: data_dir()? })
    }

    /// Use an explicit directory (tests point this at a temp dir).
    pub fn at(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Load a blob, falling back to `T::default()` when the file is
    /// missing or does not parse.
    pub fn load_or_default<T: DeserializeOwned + Default>(&self, file: &str) -> T {
        self.load(file).unwrap_or_default()
    }

    /// Load a blob if it exists and parses.
    pub fn load<T: DeserializeOwned>(&self, file: &str) -> Option<T> {
        let content = std::fs::read_to_string(self.dir.join(file)).ok()?;
        serde_json::from_str(&content).ok()
    }

    /// Persist a blob atomically (temp file + rename).
    pub fn save<T: Serialize>(&self, file: &str, value: &T) -> Result<(), StorageError> {
        let content =
            serde_json::to_string_pretty(value).map_err(|source| StorageError::EncodeFailed {
                file: file.to_string(),
                source,
            })?;
        let path = self.dir.join(file);
        let tmp = self.dir.join(format!("{file}.tmp"));
        let result = (|| -> std::io::Result<()> {
            std::fs::create_dir_all(&self.dir)?;
            std::fs::write(&tmp, &content)?;
            std::fs::rename(&tmp, &path)
        })();
        result.map_err(|source| StorageError::WriteFailed {
            file: file.to_string(),
            source,
        })
    }
}
