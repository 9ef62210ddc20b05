// Integration test: metronome control surface
//
// Drives the facade with a manual clock and a recording sound port.

mod common;

use common::{RecordingSoundPort, test_metronome};
use practice_metronome::{
    ClickType, KeyValueStore, ManualClock, Metronome, MetronomeObserver, Notification,
    NotificationCategory, Snapshot, SoundStatus, StoreError, TempoState, TimeSignature,
};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

/// Advance to the next wake-up and run it
fn step(metronome: &mut common::TestMetronome, clock: &ManualClock) -> usize {
    if let Some(wait) = metronome.next_wake() {
        clock.advance(wait.as_secs_f64() * 1000.0);
    }
    metronome.poll()
}

#[derive(Default, Clone)]
struct Recorder {
    snapshots: Rc<RefCell<Vec<Snapshot>>>,
    notifications: Rc<RefCell<Vec<Notification>>>,
}

impl MetronomeObserver for Recorder {
    fn on_snapshot(&mut self, snapshot: &Snapshot) {
        self.snapshots.borrow_mut().push(*snapshot);
    }

    fn on_notification(&mut self, notification: &Notification) {
        self.notifications.borrow_mut().push(notification.clone());
    }
}

impl Recorder {
    fn fired_beats(&self) -> Vec<i32> {
        let mut beats = Vec::new();
        let mut last = -1;
        for s in self.snapshots.borrow().iter() {
            if s.is_playing && s.current_beat != last {
                beats.push(s.current_beat);
            }
            last = s.current_beat;
        }
        beats
    }
}

#[test]
fn test_stop_right_after_start() {
    let (mut metronome, clock, port, _store) = test_metronome();

    metronome.start();
    metronome.stop();
    assert_eq!(metronome.current_beat(), -1);
    assert!(!metronome.is_playing());

    clock.advance(10_000.0);
    assert_eq!(metronome.poll(), 0);
    assert_eq!(port.played(), vec![ClickType::Accent]);
    assert_eq!(metronome.current_beat(), -1);
}

#[test]
fn test_restart_begins_new_sequence() {
    let (mut metronome, clock, port, _store) = test_metronome();

    metronome.start();
    step(&mut metronome, &clock);
    step(&mut metronome, &clock);
    assert_eq!(metronome.current_beat(), 2);

    metronome.stop();
    clock.advance(123.0);
    metronome.start();
    assert_eq!(metronome.current_beat(), 0);
    assert_eq!(metronome.next_wake(), Some(Duration::from_millis(750)));
    assert_eq!(port.played().last(), Some(&ClickType::Accent));
}

#[test]
fn test_bpm_change_keeps_scheduled_beat() {
    let (mut metronome, clock, _port, _store) = test_metronome();
    metronome.start();

    // 80 BPM: beat 1 due at 750 ms
    clock.advance(100.0);
    metronome.set_bpm(120.0);
    assert_eq!(metronome.next_wake(), Some(Duration::from_millis(650)));

    assert_eq!(step(&mut metronome, &clock), 1);
    assert_eq!(clock_now(&clock), 750.0);
    // New tempo from here on
    assert_eq!(metronome.next_wake(), Some(Duration::from_millis(500)));
}

fn clock_now(clock: &ManualClock) -> f64 {
    use practice_metronome::Clock;
    clock.now_ms()
}

#[test]
fn test_signature_change_mid_bar() {
    let (mut metronome, clock, _port, _store) = test_metronome();
    let recorder = Recorder::default();
    metronome.subscribe(recorder.clone());

    metronome.start();
    step(&mut metronome, &clock);
    metronome.set_time_signature(TimeSignature::ThreeFour);
    for _ in 0..4 {
        step(&mut metronome, &clock);
    }

    assert_eq!(recorder.fired_beats(), vec![0, 1, 2, 0, 1, 2]);
}

#[test]
fn test_signature_change_to_shorter_bar_lands_on_downbeat() {
    let (mut metronome, clock, port, _store) = test_metronome();
    metronome.start();
    step(&mut metronome, &clock);
    step(&mut metronome, &clock);
    assert_eq!(metronome.current_beat(), 2);

    metronome.set_time_signature(TimeSignature::TwoFour);
    step(&mut metronome, &clock);
    // Pending beat 3 no longer exists in 2/4
    assert_eq!(metronome.current_beat(), 0);
    assert_eq!(port.played().last(), Some(&ClickType::Accent));
}

#[test]
fn test_failed_sounds_still_tick() {
    let (mut metronome, clock, port, _store) = test_metronome();
    port.set_status(SoundStatus::Failed);
    let recorder = Recorder::default();
    metronome.subscribe(recorder.clone());

    assert!(metronome.start());
    for _ in 0..3 {
        step(&mut metronome, &clock);
    }

    assert_eq!(recorder.fired_beats(), vec![0, 1, 2, 3]);
    assert!(port.played().is_empty());
    assert!(
        recorder
            .notifications
            .borrow()
            .iter()
            .any(|n| n.category == NotificationCategory::Audio)
    );
}

#[test]
fn test_start_waits_for_sounds() {
    let (mut metronome, _clock, port, _store) = test_metronome();
    port.set_status(SoundStatus::Loading);

    assert!(!metronome.start());
    assert_eq!(metronome.current_beat(), -1);

    metronome
        .load_sounds("tick.wav".as_ref(), "tock.wav".as_ref())
        .unwrap();
    assert!(metronome.start());
    assert_eq!(port.played(), vec![ClickType::Accent]);
}

#[test]
fn test_sound_failure_during_playback_is_reported() {
    let (mut metronome, clock, port, _store) = test_metronome();
    let recorder = Recorder::default();
    metronome.subscribe(recorder.clone());
    metronome.start();

    port.set_status(SoundStatus::Failed);
    step(&mut metronome, &clock);

    assert_eq!(metronome.current_beat(), 1);
    assert_eq!(port.played().len(), 1);
    assert_eq!(recorder.notifications.borrow().len(), 1);
    assert_eq!(
        recorder.snapshots.borrow().last().map(|s| s.sound_status),
        Some(SoundStatus::Failed)
    );
}

#[test]
fn test_tap_tempo_five_gaps_of_500ms() {
    let (mut metronome, clock, _port, _store) = test_metronome();

    assert_eq!(metronome.tap(), None);
    for _ in 0..5 {
        clock.advance(500.0);
        metronome.tap();
    }
    assert_eq!(metronome.bpm(), 120);
}

#[test]
fn test_tap_after_long_pause_starts_over() {
    let (mut metronome, clock, _port, _store) = test_metronome();

    metronome.tap();
    clock.advance(500.0);
    assert_eq!(metronome.tap(), Some(120));

    clock.advance(3000.0);
    assert_eq!(metronome.tap(), None);
    assert_eq!(metronome.tap_count(), 1);
    assert_eq!(metronome.bpm(), 120);

    clock.advance(1000.0);
    assert_eq!(metronome.tap(), Some(60));
}

#[test]
fn test_tap_clamps_to_range() {
    let (mut metronome, clock, _port, _store) = test_metronome();
    metronome.tap();
    clock.advance(100.0);
    assert_eq!(metronome.tap(), Some(240));
}

#[test]
fn test_set_bpm_clamps_and_rounds() {
    let (mut metronome, _clock, _port, _store) = test_metronome();

    metronome.set_bpm(10.0);
    assert_eq!(metronome.bpm(), 30);
    metronome.set_bpm(999.0);
    assert_eq!(metronome.bpm(), 240);
    metronome.set_bpm(99.6);
    assert_eq!(metronome.bpm(), 100);
    metronome.set_bpm(f64::NAN);
    assert_eq!(metronome.bpm(), 100);

    metronome.adjust_bpm(-200);
    assert_eq!(metronome.bpm(), 30);
}

struct FailingStore;

impl KeyValueStore for FailingStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Ok(None)
    }

    fn set(&mut self, _key: &str, _value: &str) -> Result<(), StoreError> {
        Err(StoreError::NoDataDir)
    }
}

#[test]
fn test_store_failure_is_a_warning() {
    let clock = ManualClock::new(0.0);
    let tempo = TempoState::load(Box::new(FailingStore));
    let mut metronome = Metronome::new(tempo, RecordingSoundPort::ready(), clock);
    let recorder = Recorder::default();
    metronome.subscribe(recorder.clone());

    metronome.set_bpm(150.0);

    assert_eq!(metronome.bpm(), 150);
    let notifications = recorder.notifications.borrow();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].category, NotificationCategory::Storage);
}
