// Observer fan-out - full state snapshots pushed on every change

use crate::messaging::notification::Notification;
use crate::sound::SoundStatus;
use crate::tempo::TimeSignature;

/// Everything a view needs to render the metronome
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snapshot {
    pub is_playing: bool,
    /// Beat that last fired, -1 when stopped
    pub current_beat: i32,
    pub bpm: u32,
    pub time_signature: TimeSignature,
    pub sound_status: SoundStatus,
}

impl Snapshot {
    pub fn beats_per_bar(&self) -> u32 {
        self.time_signature.beats_per_bar()
    }
}

pub trait MetronomeObserver {
    fn on_snapshot(&mut self, snapshot: &Snapshot);

    fn on_notification(&mut self, _notification: &Notification) {}
}

impl<F> MetronomeObserver for F
where
    F: FnMut(&Snapshot),
{
    fn on_snapshot(&mut self, snapshot: &Snapshot) {
        self(snapshot)
    }
}
