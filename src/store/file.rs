// File-backed store: one JSON document per key under the app data directory

use super::{KeyValueStore, StoreError};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Directory name used under the platform data directory
pub const APP_DIR_NAME: &str = "practice-metronome";

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    /// Store rooted at an explicit directory (created lazily on first write)
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Store rooted at `<data_dir>/practice-metronome`
    pub fn in_data_dir() -> Result<Self, StoreError> {
        let data_dir = dirs::data_dir().ok_or(StoreError::NoDataDir)?;
        Ok(Self::new(data_dir.join(APP_DIR_NAME)))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(format!("{}.json", key)))
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => {
                // Reject anything that is not a JSON document
                serde_json::from_str::<serde_json::Value>(&contents)?;
                Ok(Some(contents))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        serde_json::from_str::<serde_json::Value>(value)?;

        fs::create_dir_all(&self.root)?;

        // Write then rename so a crash never leaves a truncated document
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, value)?;
        fs::rename(&tmp_path, &path)?;

        log::debug!("Saved {} to {}", key, path.display());
        Ok(())
    }
}
