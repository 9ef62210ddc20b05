// Tempo module
// Time signatures, persisted tempo state and tap tempo estimation

pub mod signature;
pub mod state;
pub mod tap;

pub use signature::{SignatureParseError, TimeSignature};
pub use state::{
    DEFAULT_BPM, MAX_BPM, MIN_BPM, STORE_KEY, TempoSettings, TempoState, clamp_bpm,
};
pub use tap::{MAX_TAP_HISTORY, TAP_RESET_GAP_MS, TapTempoEstimator};
