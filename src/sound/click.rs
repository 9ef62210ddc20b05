// Click voice - plays the preloaded accent/normal samples in the audio callback

use super::ClickType;
use std::sync::Arc;

/// The two preloaded click sounds, mono, at the output sample rate
#[derive(Debug, Clone)]
pub struct ClickBank {
    accent_samples: Vec<f32>,
    normal_samples: Vec<f32>,
}

impl ClickBank {
    pub fn new(accent_samples: Vec<f32>, normal_samples: Vec<f32>) -> Self {
        Self {
            accent_samples,
            normal_samples,
        }
    }

    /// Get click samples for given type
    pub fn get_click(&self, click_type: ClickType) -> &[f32] {
        match click_type {
            ClickType::Accent => &self.accent_samples,
            ClickType::Normal => &self.normal_samples,
        }
    }
}

/// Active click playback state
#[derive(Debug, Clone)]
struct ClickPlayback {
    click_type: ClickType,
    position: usize, // Current position in click buffer
}

/// Single-voice click player owned by the audio callback
/// A new trigger restarts from the beginning instead of overlapping
#[derive(Debug, Clone)]
pub struct ClickVoice {
    bank: Option<Arc<ClickBank>>,
    volume: f32,
    current_click: Option<ClickPlayback>,
}

impl ClickVoice {
    pub fn new(volume: f32) -> Self {
        Self {
            bank: None,
            volume: volume.clamp(0.0, 1.0),
            current_click: None,
        }
    }

    /// Swap in a new bank; any click in flight is dropped
    pub fn set_bank(&mut self, bank: Option<Arc<ClickBank>>) {
        self.bank = bank;
        self.current_click = None;
    }

    pub fn has_bank(&self) -> bool {
        self.bank.is_some()
    }

    /// Set volume (0.0 to 1.0)
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Restart playback of the given click; ignored without a bank
    pub fn trigger(&mut self, click_type: ClickType) {
        if self.bank.is_none() {
            return;
        }

        self.current_click = Some(ClickPlayback {
            click_type,
            position: 0,
        });
    }

    pub fn is_playing(&self) -> bool {
        self.current_click.is_some()
    }

    /// Process one sample of click output
    /// Returns 0.0 when nothing is playing
    pub fn process_sample(&mut self) -> f32 {
        let (Some(bank), Some(playback)) = (&self.bank, &mut self.current_click) else {
            return 0.0;
        };

        let click_samples = bank.get_click(playback.click_type);
        if playback.position < click_samples.len() {
            let sample = click_samples[playback.position] * self.volume;
            playback.position += 1;
            sample
        } else {
            // Click finished
            self.current_click = None;
            0.0
        }
    }

    /// Fill a mono buffer
    pub fn process_buffer(&mut self, output: &mut [f32]) {
        for sample in output.iter_mut() {
            *sample = self.process_sample();
        }
    }

    pub fn reset(&mut self) {
        self.current_click = None;
    }
}
