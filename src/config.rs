// Application configuration, stored as RON next to the other user config

use crate::session::DEFAULT_TARGET_SECS;
use crate::store::{APP_DIR_NAME, JsonFileStore, StoreError};
use crate::tempo::{MAX_TAP_HISTORY, TAP_RESET_GAP_MS, TapTempoEstimator};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "config.ron";

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid config: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("RON error: {0}")]
    Ron(#[from] ron::Error),

    #[error("No config directory on this platform")]
    NoConfigDir,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Sound for the downbeat
    pub accent_sample: PathBuf,
    /// Sound for every other beat
    pub normal_sample: PathBuf,
    /// Output volume, 0.0..=1.0
    pub volume: f32,
    pub tap_reset_gap_ms: f64,
    pub tap_history: usize,
    /// Where tempo settings are saved; the app data directory when unset
    pub store_dir: Option<PathBuf>,
    pub practice_target_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        let sounds = dirs::data_dir()
            .unwrap_or_default()
            .join(APP_DIR_NAME)
            .join("sounds");

        Self {
            accent_sample: sounds.join("tick.wav"),
            normal_sample: sounds.join("tock.wav"),
            volume: 0.8,
            tap_reset_gap_ms: TAP_RESET_GAP_MS,
            tap_history: MAX_TAP_HISTORY,
            store_dir: None,
            practice_target_secs: DEFAULT_TARGET_SECS,
        }
    }
}

impl AppConfig {
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Read the user config, writing the defaults on first run
    ///
    /// A broken or unreadable file is logged and replaced by defaults in
    /// memory only, the file itself is left for the user to fix.
    pub fn read() -> Self {
        let path = match Self::default_path() {
            Ok(path) => path,
            Err(e) => {
                log::warn!("{}, using default config", e);
                return Self::default();
            }
        };

        match Self::load_from(&path) {
            Ok(config) => config,
            Err(ConfigError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
                let config = Self::default();
                if let Err(e) = config.write_to(&path) {
                    log::warn!("Could not write default config to {}: {}", path.display(), e);
                }
                config
            }
            Err(e) => {
                log::warn!("Could not read {}: {}, using defaults", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = ron::from_str(&raw)?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config.sanitized())
    }

    pub fn write_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let raw = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?;
        std::fs::write(path, raw)?;
        Ok(())
    }

    fn sanitized(mut self) -> Self {
        self.volume = if self.volume.is_finite() {
            self.volume.clamp(0.0, 1.0)
        } else {
            Self::default().volume
        };
        if !(self.tap_reset_gap_ms.is_finite() && self.tap_reset_gap_ms > 0.0) {
            self.tap_reset_gap_ms = TAP_RESET_GAP_MS;
        }
        self
    }

    pub fn tap_estimator(&self) -> TapTempoEstimator {
        TapTempoEstimator::with_limits(self.tap_reset_gap_ms, self.tap_history)
    }

    pub fn open_store(&self) -> Result<JsonFileStore, StoreError> {
        match &self.store_dir {
            Some(dir) => Ok(JsonFileStore::new(dir)),
            None => JsonFileStore::in_data_dir(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE_NAME);

        let config = AppConfig {
            volume: 0.5,
            tap_history: 4,
            store_dir: Some(dir.path().to_path_buf()),
            ..AppConfig::default()
        };
        config.write_to(&path).unwrap();

        assert_eq!(AppConfig::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "(volume: 0.25)").unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.volume, 0.25);
        assert_eq!(config.tap_reset_gap_ms, TAP_RESET_GAP_MS);
        assert_eq!(config.tap_history, MAX_TAP_HISTORY);
        assert_eq!(config.store_dir, None);
    }

    #[test]
    fn test_out_of_range_values_are_sanitized() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "(volume: 3.0, tap_reset_gap_ms: -1.0)").unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.volume, 1.0);
        assert_eq!(config.tap_reset_gap_ms, TAP_RESET_GAP_MS);
    }

    #[test]
    fn test_invalid_ron_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "(volume: ").unwrap();

        assert!(matches!(
            AppConfig::load_from(&path),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file_is_io_not_found() {
        let dir = TempDir::new().unwrap();
        let result = AppConfig::load_from(&dir.path().join(CONFIG_FILE_NAME));
        assert!(matches!(result, Err(ConfigError::Io(e)) if e.kind() == io::ErrorKind::NotFound));
    }

    #[test]
    fn test_store_dir_override() {
        let dir = TempDir::new().unwrap();
        let config = AppConfig {
            store_dir: Some(dir.path().to_path_buf()),
            ..AppConfig::default()
        };
        assert_eq!(config.open_store().unwrap().root(), dir.path());
    }
}
