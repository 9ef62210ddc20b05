// Scheduler module
// Clocks, cooperative one-shot timers and the beat state machine

pub mod beat;
pub mod clock;
pub mod timer;

pub use beat::{Beat, BeatScheduler, Generation, SchedulerState};
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use timer::{TimerId, TimerQueue};
