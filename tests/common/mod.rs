// Shared test doubles

#![allow(dead_code)]

use practice_metronome::{
    ClickType, ManualClock, MemoryStore, Metronome, SoundError, SoundPort, SoundStatus,
    TempoState,
};
use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

/// Sound port that records every click, with a settable status
#[derive(Clone, Default)]
pub struct RecordingSoundPort {
    pub status: Rc<RefCell<SoundStatus>>,
    pub played: Rc<RefCell<Vec<ClickType>>>,
}

impl RecordingSoundPort {
    pub fn ready() -> Self {
        let port = Self::default();
        port.set_status(SoundStatus::Ready);
        port
    }

    pub fn set_status(&self, status: SoundStatus) {
        *self.status.borrow_mut() = status;
    }

    pub fn played(&self) -> Vec<ClickType> {
        self.played.borrow().clone()
    }
}

impl SoundPort for RecordingSoundPort {
    fn load_sounds(&mut self, _accent: &Path, _normal: &Path) -> Result<(), SoundError> {
        self.set_status(SoundStatus::Ready);
        Ok(())
    }

    fn status(&self) -> SoundStatus {
        *self.status.borrow()
    }

    fn play(&mut self, click: ClickType) {
        self.played.borrow_mut().push(click);
    }

    fn unload(&mut self) {
        self.set_status(SoundStatus::Unloaded);
    }
}

pub type TestMetronome = Metronome<RecordingSoundPort, ManualClock>;

/// Metronome at t = 0 with ready sounds and an in-memory store
pub fn test_metronome() -> (TestMetronome, ManualClock, RecordingSoundPort, MemoryStore) {
    let clock = ManualClock::new(0.0);
    let port = RecordingSoundPort::ready();
    let store = MemoryStore::new();
    let tempo = TempoState::load(Box::new(store.clone()));
    let metronome = Metronome::new(tempo, port.clone(), clock.clone());
    (metronome, clock, port, store)
}
