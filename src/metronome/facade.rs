// Metronome facade - composes tempo, tap tempo, beat scheduling and sound
//
// # Execution model
//
// Everything runs on the owning thread. Control calls take effect
// synchronously; beats fire from `poll`, which the host calls whenever
// `next_wake` says a wake-up is due. At most one wake-up is pending at a time
// and it carries the generation of the run that scheduled it.

use std::path::Path;
use std::time::Duration;

use super::observer::{MetronomeObserver, Snapshot};
use crate::messaging::notification::{Notification, NotificationCategory};
use crate::scheduler::{Beat, BeatScheduler, Clock, Generation, TimerId, TimerQueue};
use crate::sound::{SoundError, SoundPort, SoundStatus};
use crate::store::StoreError;
use crate::tempo::{TapTempoEstimator, TempoState, TimeSignature};

pub struct Metronome<S: SoundPort, C: Clock> {
    tempo: TempoState,
    tap: TapTempoEstimator,
    scheduler: BeatScheduler,
    timers: TimerQueue<Generation>,
    pending: Option<TimerId>,
    sound: S,
    clock: C,
    current_beat: i32,
    observers: Vec<Box<dyn MetronomeObserver>>,
    // Last status observers were told about
    reported_sound_status: SoundStatus,
}

impl<S: SoundPort, C: Clock> Metronome<S, C> {
    pub fn new(tempo: TempoState, sound: S, clock: C) -> Self {
        let reported_sound_status = sound.status();
        Self {
            tempo,
            tap: TapTempoEstimator::new(),
            scheduler: BeatScheduler::new(),
            timers: TimerQueue::new(),
            pending: None,
            sound,
            clock,
            current_beat: -1,
            observers: Vec::new(),
            reported_sound_status,
        }
    }

    /// Replace the default tap estimator (reset gap / history length)
    pub fn with_tap_estimator(mut self, tap: TapTempoEstimator) -> Self {
        self.tap = tap;
        self
    }

    // ========== Queries ==========

    pub fn is_playing(&self) -> bool {
        self.scheduler.is_running()
    }

    /// Beat that last fired, -1 when stopped
    pub fn current_beat(&self) -> i32 {
        self.current_beat
    }

    pub fn bpm(&self) -> u32 {
        self.tempo.bpm()
    }

    pub fn time_signature(&self) -> TimeSignature {
        self.tempo.time_signature()
    }

    pub fn sound_status(&self) -> SoundStatus {
        self.sound.status()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            is_playing: self.is_playing(),
            current_beat: self.current_beat,
            bpm: self.tempo.bpm(),
            time_signature: self.tempo.time_signature(),
            sound_status: self.sound.status(),
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn sound(&self) -> &S {
        &self.sound
    }

    pub fn sound_mut(&mut self) -> &mut S {
        &mut self.sound
    }

    /// Register an observer; it immediately receives the current snapshot
    pub fn subscribe<O: MetronomeObserver + 'static>(&mut self, mut observer: O) {
        observer.on_snapshot(&self.snapshot());
        self.observers.push(Box::new(observer));
    }

    // ========== Transport ==========

    /// Start from beat 0; returns false while the sounds are still loading
    ///
    /// Already playing is a no-op. With failed sounds the metronome runs
    /// silently.
    pub fn start(&mut self) -> bool {
        if self.is_playing() {
            return true;
        }

        self.sync_sound_status();
        match self.sound.status() {
            SoundStatus::Loading => {
                log::info!("Start ignored: click sounds still loading");
                return false;
            }
            SoundStatus::Ready => {}
            SoundStatus::Failed | SoundStatus::Unloaded => {
                log::warn!("Starting without click sounds");
                self.publish(Notification::warning(
                    NotificationCategory::Audio,
                    "Click sounds unavailable, ticking silently".to_string(),
                ));
            }
        }

        let now = self.clock.now_ms();
        let generation = self.scheduler.start(now);
        log::debug!("Metronome started (generation {})", generation);

        self.fire(generation, now);
        true
    }

    /// Stop and cancel the pending wake-up; calling it again does nothing
    pub fn stop(&mut self) {
        if let Some(id) = self.pending.take() {
            self.timers.cancel(id);
        }

        if self.scheduler.stop() {
            log::debug!("Metronome stopped");
            self.current_beat = -1;
            self.notify();
        }
    }

    /// Returns the new playing state
    pub fn toggle(&mut self) -> bool {
        if self.is_playing() {
            self.stop();
        } else {
            self.start();
        }
        self.is_playing()
    }

    /// Run every wake-up that is due; returns the number of beats fired
    ///
    /// Beats that are overdue fire back to back, none are skipped.
    pub fn poll(&mut self) -> usize {
        self.sync_sound_status();

        let mut fired = 0;
        loop {
            let now = self.clock.now_ms();
            let Some((id, generation)) = self.timers.pop_due(now) else {
                break;
            };
            if self.pending == Some(id) {
                self.pending = None;
            }
            if self.fire(generation, now).is_some() {
                fired += 1;
            }
        }
        fired
    }

    /// Time until the next wake-up, None when nothing is scheduled
    pub fn next_wake(&self) -> Option<Duration> {
        let due = self.timers.next_due()?;
        let delay_ms = (due - self.clock.now_ms()).max(0.0);
        Some(Duration::from_micros((delay_ms * 1000.0).round() as u64))
    }

    fn fire(&mut self, generation: Generation, now: f64) -> Option<Beat> {
        let beat = self.scheduler.fire(
            generation,
            now,
            self.tempo.bpm(),
            self.tempo.time_signature().beats_per_bar(),
        );
        let Some(beat) = beat else {
            log::debug!("Discarding stale wake-up (generation {})", generation);
            return None;
        };

        if self.sound.status().is_ready() {
            self.sound.play(beat.click);
        }
        self.current_beat = beat.index as i32;

        self.pending = Some(self.timers.schedule(now, beat.next_delay_ms, generation));
        self.notify();
        Some(beat)
    }

    // ========== Tempo ==========

    pub fn set_bpm(&mut self, value: f64) {
        let result = self.tempo.set_bpm(value);
        self.after_tempo_change(result);
    }

    pub fn adjust_bpm(&mut self, delta: i32) {
        let result = self.tempo.adjust_bpm(delta);
        self.after_tempo_change(result);
    }

    /// Takes effect at the next tick; the running bar is not restarted
    pub fn set_time_signature(&mut self, time_signature: TimeSignature) {
        let result = self.tempo.set_time_signature(time_signature);
        self.after_tempo_change(result);
    }

    /// Register a tap; returns the new bpm once enough taps have arrived
    ///
    /// The beat cycle is not restarted, the next scheduled beat keeps its time.
    pub fn tap(&mut self) -> Option<u32> {
        let now = self.clock.now_ms();
        let estimate = self.tap.tap(now)?;
        self.set_bpm(estimate);
        Some(self.tempo.bpm())
    }

    pub fn tap_count(&self) -> usize {
        self.tap.tap_count()
    }

    fn after_tempo_change(&mut self, result: Result<(), StoreError>) {
        if let Err(e) = result {
            log::warn!("Could not save tempo settings: {}", e);
            self.publish(Notification::warning(
                NotificationCategory::Storage,
                format!("Could not save tempo settings: {}", e),
            ));
        }
        self.notify();
    }

    // ========== Sound ==========

    /// Load the click sounds; on failure the metronome keeps working silently
    pub fn load_sounds(&mut self, accent: &Path, normal: &Path) -> Result<(), SoundError> {
        let result = self.sound.load_sounds(accent, normal);

        match &result {
            Ok(()) => log::info!("Click sounds loaded"),
            Err(e) => {
                log::warn!("Click sounds unavailable: {}", e);
                self.publish(Notification::warning(
                    NotificationCategory::Audio,
                    format!("Click sounds unavailable, ticking silently: {}", e),
                ));
            }
        }

        self.reported_sound_status = self.sound.status();
        self.notify();
        result
    }

    /// Stop and release the sounds
    pub fn shutdown(&mut self) {
        self.stop();
        self.sound.unload();
        self.timers.clear();
        self.sync_sound_status();
        log::info!("Metronome shut down");
    }

    // Tell observers when the port changed status on its own
    fn sync_sound_status(&mut self) {
        let status = self.sound.status();
        if status == self.reported_sound_status {
            return;
        }
        self.reported_sound_status = status;

        if status == SoundStatus::Failed {
            log::warn!("Click sounds failed, ticking silently");
            self.publish(Notification::warning(
                NotificationCategory::Audio,
                "Click sounds unavailable, ticking silently".to_string(),
            ));
        }
        self.notify();
    }

    // ========== Observers ==========

    fn notify(&mut self) {
        let snapshot = self.snapshot();
        for observer in &mut self.observers {
            observer.on_snapshot(&snapshot);
        }
    }

    fn publish(&mut self, notification: Notification) {
        for observer in &mut self.observers {
            observer.on_notification(&notification);
        }
    }
}

impl<S: SoundPort, C: Clock> std::fmt::Debug for Metronome<S, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metronome")
            .field("tempo", &self.tempo)
            .field("scheduler", &self.scheduler)
            .field("current_beat", &self.current_beat)
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}
