// Practice Metronome - Library exports for the binaries, tests and benchmarks

pub mod config;
pub mod messaging;
pub mod metronome;
pub mod scheduler;
pub mod session;
pub mod sound;
pub mod store;
pub mod tempo;
pub mod ui;

// Re-export commonly used types for convenience
pub use config::{AppConfig, ConfigError};
pub use messaging::channels::{create_command_channel, create_notification_channel};
pub use messaging::notification::{Notification, NotificationCategory, NotificationLevel};
pub use metronome::{Metronome, MetronomeObserver, Snapshot};
pub use scheduler::{BeatScheduler, Clock, ManualClock, MonotonicClock, TimerQueue};
pub use session::PracticeTimer;
pub use sound::{ClickType, CpalSoundPort, MutedSoundPort, SoundError, SoundPort, SoundStatus};
pub use store::{JsonFileStore, KeyValueStore, MemoryStore, StoreError};
pub use tempo::{TapTempoEstimator, TempoSettings, TempoState, TimeSignature};
