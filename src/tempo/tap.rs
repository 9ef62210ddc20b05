// Tap tempo - derives a bpm estimate from user tap timestamps

use std::collections::VecDeque;

/// Gap after which a tap starts a fresh tapping session
pub const TAP_RESET_GAP_MS: f64 = 2500.0;

/// Number of most recent taps kept for the estimate
pub const MAX_TAP_HISTORY: usize = 8;

#[derive(Debug, Clone)]
pub struct TapTempoEstimator {
    taps: VecDeque<f64>,
    reset_gap_ms: f64,
    max_taps: usize,
}

impl TapTempoEstimator {
    pub fn new() -> Self {
        Self::with_limits(TAP_RESET_GAP_MS, MAX_TAP_HISTORY)
    }

    /// Estimator with a custom reset gap and history length
    /// History length is at least 2 so an estimate is always possible
    pub fn with_limits(reset_gap_ms: f64, max_taps: usize) -> Self {
        let max_taps = max_taps.max(2);
        Self {
            taps: VecDeque::with_capacity(max_taps),
            reset_gap_ms,
            max_taps,
        }
    }

    /// Record a tap at `now_ms` (monotonic clock)
    ///
    /// Returns the rounded bpm estimate once at least two taps are buffered.
    /// A tap arriving after the reset gap only seeds a new session.
    pub fn tap(&mut self, now_ms: f64) -> Option<f64> {
        if let Some(&last) = self.taps.back()
            && now_ms - last > self.reset_gap_ms
        {
            self.taps.clear();
            self.taps.push_back(now_ms);
            return None;
        }

        self.taps.push_back(now_ms);
        while self.taps.len() > self.max_taps {
            self.taps.pop_front();
        }

        self.estimate()
    }

    /// Mean of consecutive intervals converted to bpm
    fn estimate(&self) -> Option<f64> {
        if self.taps.len() < 2 {
            return None;
        }

        let (first, last) = (self.taps.front()?, self.taps.back()?);
        // Sum of consecutive intervals telescopes to last - first
        let mean_interval = (last - first) / (self.taps.len() - 1) as f64;
        if mean_interval <= 0.0 {
            return None;
        }

        Some((60_000.0 / mean_interval).round())
    }

    pub fn tap_count(&self) -> usize {
        self.taps.len()
    }

    pub fn reset(&mut self) {
        self.taps.clear();
    }
}

impl Default for TapTempoEstimator {
    fn default() -> Self {
        Self::new()
    }
}
