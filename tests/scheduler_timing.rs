// Integration test: beat timing accuracy
//
// Wake-ups are simulated with random lateness; the beat grid must not drift.

mod common;

use practice_metronome::{BeatScheduler, ClickType, Clock};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[test]
fn test_no_drift_over_1000_jittered_beats() {
    const BPM: u32 = 120;
    const BEATS: u64 = 1000;
    let interval = 60_000.0 / BPM as f64;

    let mut rng = StdRng::seed_from_u64(42);
    let mut scheduler = BeatScheduler::new();
    let generation = scheduler.start(0.0);

    let mut now = 0.0;
    let mut last_due = f64::NEG_INFINITY;
    let mut dues = Vec::new();

    for _ in 0..BEATS {
        let beat = scheduler.fire(generation, now, BPM, 4).unwrap();
        assert!(beat.due_ms > last_due, "deadlines must increase");
        last_due = beat.due_ms;
        dues.push(beat.due_ms);

        // Host wakes up 0-40 ms late
        now += beat.next_delay_ms + rng.gen_range(0.0..40.0);
    }

    let mean = (dues[dues.len() - 1] - dues[0]) / (dues.len() - 1) as f64;
    assert!((mean - interval).abs() < 1e-9, "mean interval {}", mean);
    assert_eq!(dues[999], 999.0 * interval);
}

#[test]
fn test_facade_plays_on_grid_despite_late_polls() {
    let (mut metronome, clock, port, _store) = common::test_metronome();
    metronome.set_bpm(120.0);
    metronome.start();

    let mut rng = StdRng::seed_from_u64(7);
    let mut fired = 1;
    while fired < 200 {
        let wait = metronome.next_wake().unwrap().as_secs_f64() * 1000.0;
        clock.advance(wait + rng.gen_range(1.0..30.0));
        fired += metronome.poll();
    }

    // Beat 199 was due at 99.5 s, so beat 200 is due at exactly 100 s
    assert_eq!(fired, 200);
    let next_due = clock.now_ms() + metronome.next_wake().unwrap().as_secs_f64() * 1000.0;
    assert!((next_due - 100_000.0).abs() < 0.01, "next due {}", next_due);

    let played = port.played();
    assert_eq!(played.len(), fired);
    for (n, click) in played.iter().enumerate() {
        let expected = if n % 4 == 0 { ClickType::Accent } else { ClickType::Normal };
        assert_eq!(*click, expected, "beat {}", n);
    }
}

#[test]
fn test_accent_pattern_per_signature() {
    use practice_metronome::TimeSignature;

    for signature in TimeSignature::ALL {
        let (mut metronome, clock, port, _store) = common::test_metronome();
        metronome.set_time_signature(signature);
        metronome.start();

        let beats = signature.beats_per_bar() as usize * 3;
        while port.played().len() < beats {
            clock.advance(metronome.next_wake().unwrap().as_secs_f64() * 1000.0);
            metronome.poll();
        }

        let accents: Vec<usize> = port
            .played()
            .iter()
            .enumerate()
            .filter(|(_, c)| **c == ClickType::Accent)
            .map(|(n, _)| n)
            .collect();
        let bar = signature.beats_per_bar() as usize;
        assert_eq!(accents, vec![0, bar, 2 * bar], "{}", signature);
    }
}
