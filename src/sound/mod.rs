// Sound module - click playback behind the SoundPort seam
//
// The metronome only ever talks to a `SoundPort`. The cpal-backed port lives in
// `engine`; `MutedSoundPort` stands in when no output device is available.

pub mod click;
pub mod engine;
pub mod loader;

pub use click::{ClickBank, ClickVoice};
pub use engine::{ClickEngine, CpalSoundPort};
pub use loader::{ClickSample, load_click};

use std::path::Path;

/// Metronome click type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClickType {
    /// Click on first beat of bar (accent/downbeat)
    Accent,
    /// Click on other beats
    Normal,
}

impl ClickType {
    pub fn for_beat(beat_index: u32) -> Self {
        if beat_index == 0 {
            ClickType::Accent
        } else {
            ClickType::Normal
        }
    }
}

/// Readiness of the click sounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SoundStatus {
    /// Sounds not loaded yet; the metronome refuses to start
    #[default]
    Loading,
    Ready,
    /// Loading failed; the metronome ticks silently
    Failed,
    /// Torn down
    Unloaded,
}

impl SoundStatus {
    pub fn is_ready(&self) -> bool {
        matches!(self, SoundStatus::Ready)
    }
}

/// Sound error types
#[derive(Debug, thiserror::Error)]
pub enum SoundError {
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Could not decode {path}: {message}")]
    Decode { path: String, message: String },

    #[error("Sample is empty: {0}")]
    Empty(String),

    #[error("Resampling failed: {0}")]
    Resample(String),

    #[error("No audio output device found")]
    NoDevice,

    #[error("Audio stream error: {0}")]
    Stream(String),

    #[error("Command queue full")]
    QueueFull,
}

/// Capability to play the two preloaded click sounds
pub trait SoundPort {
    /// Decode and preload both sounds; status becomes Ready or Failed
    fn load_sounds(&mut self, accent: &Path, normal: &Path) -> Result<(), SoundError>;

    fn status(&self) -> SoundStatus;

    /// Restart the sound from its beginning and play it, fire-and-forget
    fn play(&mut self, click: ClickType);

    fn unload(&mut self);
}

impl<P: SoundPort + ?Sized> SoundPort for Box<P> {
    fn load_sounds(&mut self, accent: &Path, normal: &Path) -> Result<(), SoundError> {
        (**self).load_sounds(accent, normal)
    }

    fn status(&self) -> SoundStatus {
        (**self).status()
    }

    fn play(&mut self, click: ClickType) {
        (**self).play(click)
    }

    fn unload(&mut self) {
        (**self).unload()
    }
}

/// Port used when no audio output exists; always reports Failed
#[derive(Debug, Clone, Copy, Default)]
pub struct MutedSoundPort;

impl SoundPort for MutedSoundPort {
    fn load_sounds(&mut self, _accent: &Path, _normal: &Path) -> Result<(), SoundError> {
        Err(SoundError::NoDevice)
    }

    fn status(&self) -> SoundStatus {
        SoundStatus::Failed
    }

    fn play(&mut self, _click: ClickType) {}

    fn unload(&mut self) {}
}
