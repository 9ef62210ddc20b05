// Beat scheduler - drift-free beat timing state machine
//
// Each beat's deadline is the previous deadline plus one interval, starting from
// the origin recorded at start. Actual (late) wake-up times never feed back into
// the deadlines, so timer jitter cannot accumulate.

use crate::sound::ClickType;

/// Scheduler state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchedulerState {
    #[default]
    Stopped,
    Running,
}

/// Identifies one start→stop run; wake-ups from older runs are discarded
pub type Generation = u64;

/// A fired beat and the wake-up needed for the next one
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Beat {
    /// Index within the bar, 0 is the downbeat
    pub index: u32,
    pub click: ClickType,
    /// Deadline this beat was scheduled for
    pub due_ms: f64,
    /// Deadline of the following beat
    pub next_due_ms: f64,
    /// Delay from now until the following beat, never negative
    pub next_delay_ms: f64,
    pub generation: Generation,
}

#[derive(Debug, Clone)]
struct SchedulerRuntime {
    origin_ms: f64,
    beat_index: u32,
    next_due_ms: f64,
    beats_fired: u64,
}

#[derive(Debug, Clone, Default)]
pub struct BeatScheduler {
    runtime: Option<SchedulerRuntime>,
    generation: Generation,
}

impl BeatScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SchedulerState {
        if self.runtime.is_some() {
            SchedulerState::Running
        } else {
            SchedulerState::Stopped
        }
    }

    pub fn is_running(&self) -> bool {
        self.runtime.is_some()
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Next beat to fire, if running
    pub fn beat_index(&self) -> Option<u32> {
        self.runtime.as_ref().map(|rt| rt.beat_index)
    }

    /// Deadline of the next beat, if running
    pub fn next_due_ms(&self) -> Option<f64> {
        self.runtime.as_ref().map(|rt| rt.next_due_ms)
    }

    pub fn origin_ms(&self) -> Option<f64> {
        self.runtime.as_ref().map(|rt| rt.origin_ms)
    }

    pub fn beats_fired(&self) -> u64 {
        self.runtime.as_ref().map_or(0, |rt| rt.beats_fired)
    }

    /// Begin a new run at `now_ms`: beat 0 is due immediately
    ///
    /// Returns the generation the caller must attach to its wake-ups. Starting
    /// while running restarts from beat 0 with a new origin.
    pub fn start(&mut self, now_ms: f64) -> Generation {
        self.generation += 1;
        self.runtime = Some(SchedulerRuntime {
            origin_ms: now_ms,
            beat_index: 0,
            next_due_ms: now_ms,
            beats_fired: 0,
        });
        self.generation
    }

    /// End the run; returns false if already stopped
    pub fn stop(&mut self) -> bool {
        if self.runtime.take().is_none() {
            return false;
        }
        // Invalidate anything scheduled by the finished run
        self.generation += 1;
        true
    }

    /// Fire the due beat
    ///
    /// `bpm` and `beats_per_bar` are read at this moment: a tempo change
    /// affects the interval to the next beat only, and a signature change
    /// sets the modulus from here on. Returns None for a stale generation or
    /// when stopped.
    pub fn fire(
        &mut self,
        generation: Generation,
        now_ms: f64,
        bpm: u32,
        beats_per_bar: u32,
    ) -> Option<Beat> {
        if generation != self.generation {
            return None;
        }
        let runtime = self.runtime.as_mut()?;

        let beats_per_bar = beats_per_bar.max(1);
        // A shorter bar may leave the pending index past its end: that bar is over
        let index = if runtime.beat_index >= beats_per_bar {
            0
        } else {
            runtime.beat_index
        };

        let interval_ms = 60_000.0 / bpm.max(1) as f64;
        let due_ms = runtime.next_due_ms;

        runtime.next_due_ms += interval_ms;
        runtime.beat_index = (index + 1) % beats_per_bar;
        runtime.beats_fired += 1;

        Some(Beat {
            index,
            click: ClickType::for_beat(index),
            due_ms,
            next_due_ms: runtime.next_due_ms,
            next_delay_ms: (runtime.next_due_ms - now_ms).max(0.0),
            generation,
        })
    }
}
