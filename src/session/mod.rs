// Session module - practice session stopwatch

pub mod practice;

pub use practice::{DEFAULT_TARGET_SECS, PracticeTimer, format_duration};
