// Tempo state - bpm and time signature, clamped and persisted on every write

use super::signature::TimeSignature;
use crate::store::{KeyValueStore, StoreError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Key under which the settings document is stored
pub const STORE_KEY: &str = "metronome-store";

pub const MIN_BPM: u32 = 30;
pub const MAX_BPM: u32 = 240;
pub const DEFAULT_BPM: u32 = 80;

/// Round to the nearest integer and clamp to [MIN_BPM, MAX_BPM]
/// Returns None for NaN
pub fn clamp_bpm(value: f64) -> Option<u32> {
    if value.is_nan() {
        return None;
    }
    Some(value.round().clamp(MIN_BPM as f64, MAX_BPM as f64) as u32)
}

/// Persisted form of the tempo settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TempoSettings {
    pub bpm: u32,
    #[serde(rename = "timeSignature")]
    pub time_signature: TimeSignature,
}

impl Default for TempoSettings {
    fn default() -> Self {
        Self {
            bpm: DEFAULT_BPM,
            time_signature: TimeSignature::default(),
        }
    }
}

impl TempoSettings {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse a stored document field by field
    ///
    /// Bad fields fall back to their defaults instead of discarding the whole
    /// document. Documents wrapped as `{"state": {...}, "version": n}` are
    /// unwrapped first.
    pub fn from_json_lenient(raw: &str) -> Result<Self, serde_json::Error> {
        let document: Value = serde_json::from_str(raw)?;
        let fields = match document.get("state") {
            Some(state) if state.is_object() => state,
            _ => &document,
        };

        let bpm = fields
            .get("bpm")
            .and_then(Value::as_f64)
            .and_then(clamp_bpm)
            .unwrap_or(DEFAULT_BPM);

        let time_signature = fields
            .get("timeSignature")
            .and_then(Value::as_str)
            .and_then(|label| label.parse().ok())
            .unwrap_or_default();

        Ok(Self {
            bpm,
            time_signature,
        })
    }
}

/// Current tempo and meter, owned by the metronome and injected at construction
pub struct TempoState {
    settings: TempoSettings,
    store: Box<dyn KeyValueStore>,
}

impl TempoState {
    /// Restore from the store, or start from defaults
    ///
    /// A store that cannot be read yields defaults; the error is logged.
    pub fn load(store: Box<dyn KeyValueStore>) -> Self {
        let settings = match store.get(STORE_KEY) {
            Ok(Some(raw)) => TempoSettings::from_json_lenient(&raw).unwrap_or_else(|e| {
                log::warn!("Ignoring unreadable tempo settings: {}", e);
                TempoSettings::default()
            }),
            Ok(None) => TempoSettings::default(),
            Err(e) => {
                log::warn!("Could not read tempo settings: {}", e);
                TempoSettings::default()
            }
        };

        log::info!(
            "Tempo state: {} BPM, {}",
            settings.bpm,
            settings.time_signature
        );

        Self { settings, store }
    }

    pub fn bpm(&self) -> u32 {
        self.settings.bpm
    }

    pub fn time_signature(&self) -> TimeSignature {
        self.settings.time_signature
    }

    pub fn settings(&self) -> TempoSettings {
        self.settings
    }

    /// Duration of one beat in milliseconds at the current bpm
    pub fn beat_interval_ms(&self) -> f64 {
        60_000.0 / self.settings.bpm as f64
    }

    /// Round, clamp and persist
    ///
    /// The in-memory value is updated even when the save fails. NaN is
    /// ignored.
    pub fn set_bpm(&mut self, value: f64) -> Result<(), StoreError> {
        let Some(bpm) = clamp_bpm(value) else {
            log::debug!("Ignoring NaN bpm");
            return Ok(());
        };
        self.settings.bpm = bpm;
        self.persist()
    }

    pub fn adjust_bpm(&mut self, delta: i32) -> Result<(), StoreError> {
        self.set_bpm(self.settings.bpm as f64 + delta as f64)
    }

    pub fn set_time_signature(&mut self, time_signature: TimeSignature) -> Result<(), StoreError> {
        self.settings.time_signature = time_signature;
        self.persist()
    }

    fn persist(&mut self) -> Result<(), StoreError> {
        let json = self.settings.to_json()?;
        self.store.set(STORE_KEY, &json)
    }
}

impl std::fmt::Debug for TempoState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TempoState")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
