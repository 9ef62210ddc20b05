//! Headless click track
//!
//! Plays a fixed number of bars without the UI and prints every beat.
//!
//! Usage: click_track [BPM] [SIGNATURE] [BARS]
//!   e.g. click_track 96 3/4 8

use practice_metronome::{
    AppConfig, CpalSoundPort, MemoryStore, Metronome, MonotonicClock, MutedSoundPort, Snapshot,
    SoundPort, TempoState, TimeSignature, create_notification_channel,
};
use std::cell::Cell;
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("practice_metronome=warn"),
    )
    .init();

    let mut args = std::env::args().skip(1);
    let bpm = args.next().map(|s| s.parse::<f64>()).transpose()?.unwrap_or(100.0);
    let signature: TimeSignature = args
        .next()
        .map(|s| s.parse::<TimeSignature>())
        .transpose()?
        .unwrap_or_default();
    let bars = args.next().map(|s| s.parse::<u64>()).transpose()?.unwrap_or(4);

    let config = AppConfig::read();
    let (notification_tx, _notification_rx) = create_notification_channel(16);

    let sound: Box<dyn SoundPort> =
        match CpalSoundPort::open(config.volume, Arc::new(Mutex::new(notification_tx))) {
            Ok(port) => Box::new(port),
            Err(e) => {
                eprintln!("No audio output ({}), printing beats only", e);
                Box::new(MutedSoundPort)
            }
        };

    // Command-line tempo must not overwrite the saved settings
    let tempo = TempoState::load(Box::new(MemoryStore::new()));
    let mut metronome = Metronome::new(tempo, sound, MonotonicClock::new());
    metronome.set_bpm(bpm);
    metronome.set_time_signature(signature);

    if let Err(e) = metronome.load_sounds(&config.accent_sample, &config.normal_sample) {
        eprintln!("Click sounds unavailable: {}", e);
    }

    let beats_fired = Rc::new(Cell::new(0u64));
    let counter = Rc::clone(&beats_fired);
    let last_beat = Cell::new(-1);
    metronome.subscribe(move |snapshot: &Snapshot| {
        if snapshot.is_playing && snapshot.current_beat != last_beat.get() {
            counter.set(counter.get() + 1);
            let marker = if snapshot.current_beat == 0 { "ACCENT" } else { "tick" };
            println!(
                "{:>4} | beat {}/{} {}",
                counter.get(),
                snapshot.current_beat + 1,
                snapshot.beats_per_bar(),
                marker
            );
        }
        last_beat.set(snapshot.current_beat);
    });

    println!(
        "Click track: {} BPM, {}, {} bars",
        metronome.bpm(),
        metronome.time_signature(),
        bars
    );

    metronome.start();
    let total_beats = bars * signature.beats_per_bar() as u64;

    while beats_fired.get() < total_beats {
        match metronome.next_wake() {
            Some(wait) => thread::sleep(wait),
            None => break,
        }
        metronome.poll();
    }

    // Let the last click ring out
    thread::sleep(Duration::from_millis(200));
    metronome.shutdown();
    Ok(())
}
