// Practice timer - pausable stopwatch measured against the shared clock
//
// Elapsed time is accumulated from clock readings rather than counted in
// one-second ticks, so a slow UI frame never loses time.

/// One hour of practice fills the progress bar
pub const DEFAULT_TARGET_SECS: u64 = 3600;

#[derive(Debug, Clone)]
pub struct PracticeTimer {
    /// Time banked by finished running spans
    accumulated_ms: f64,
    /// Start of the current running span
    running_since: Option<f64>,
    target_secs: u64,
}

impl PracticeTimer {
    pub fn new() -> Self {
        Self::with_target(DEFAULT_TARGET_SECS)
    }

    /// Timer whose progress is measured against `target_secs`
    pub fn with_target(target_secs: u64) -> Self {
        Self {
            accumulated_ms: 0.0,
            running_since: None,
            target_secs: target_secs.max(1),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running_since.is_some()
    }

    pub fn target_secs(&self) -> u64 {
        self.target_secs
    }

    pub fn start(&mut self, now_ms: f64) {
        if self.running_since.is_none() {
            self.running_since = Some(now_ms);
        }
    }

    pub fn pause(&mut self, now_ms: f64) {
        if let Some(since) = self.running_since.take() {
            self.accumulated_ms += (now_ms - since).max(0.0);
        }
    }

    /// Returns the new running state
    pub fn toggle(&mut self, now_ms: f64) -> bool {
        if self.is_running() {
            self.pause(now_ms);
        } else {
            self.start(now_ms);
        }
        self.is_running()
    }

    /// Stop and clear
    pub fn reset(&mut self) {
        self.accumulated_ms = 0.0;
        self.running_since = None;
    }

    fn elapsed_ms(&self, now_ms: f64) -> f64 {
        let running = self
            .running_since
            .map_or(0.0, |since| (now_ms - since).max(0.0));
        self.accumulated_ms + running
    }

    /// Whole seconds practiced
    pub fn elapsed_secs(&self, now_ms: f64) -> u64 {
        (self.elapsed_ms(now_ms) / 1000.0).floor() as u64
    }

    /// Fraction of the target reached, capped at 1.0
    pub fn progress(&self, now_ms: f64) -> f32 {
        (self.elapsed_secs(now_ms) as f32 / self.target_secs as f32).min(1.0)
    }

    pub fn is_complete(&self, now_ms: f64) -> bool {
        self.elapsed_secs(now_ms) >= self.target_secs
    }

    pub fn format_elapsed(&self, now_ms: f64) -> String {
        format_duration(self.elapsed_secs(now_ms))
    }
}

impl Default for PracticeTimer {
    fn default() -> Self {
        Self::new()
    }
}

/// `MM:SS`, or `HH:MM:SS` from one hour on
pub fn format_duration(total_secs: u64) -> String {
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let secs = total_secs % 60;

    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{:02}:{:02}", minutes, secs)
    }
}
