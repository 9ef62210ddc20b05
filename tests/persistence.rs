// Integration test: tempo settings persistence

use practice_metronome::tempo::STORE_KEY;
use practice_metronome::{JsonFileStore, KeyValueStore, TempoState, TimeSignature};
use tempfile::TempDir;

#[test]
fn test_settings_survive_restart() {
    let dir = TempDir::new().unwrap();

    {
        let mut tempo = TempoState::load(Box::new(JsonFileStore::new(dir.path())));
        tempo.set_bpm(133.0).unwrap();
        tempo.set_time_signature(TimeSignature::SixEight).unwrap();
    }

    let tempo = TempoState::load(Box::new(JsonFileStore::new(dir.path())));
    assert_eq!(tempo.bpm(), 133);
    assert_eq!(tempo.time_signature(), TimeSignature::SixEight);
}

#[test]
fn test_document_format() {
    let dir = TempDir::new().unwrap();
    let mut tempo = TempoState::load(Box::new(JsonFileStore::new(dir.path())));
    tempo.set_bpm(96.0).unwrap();

    let raw = std::fs::read_to_string(dir.path().join("metronome-store.json")).unwrap();
    assert_eq!(raw, r#"{"bpm":96,"timeSignature":"4/4"}"#);
}

#[test]
fn test_first_run_uses_defaults() {
    let dir = TempDir::new().unwrap();
    let tempo = TempoState::load(Box::new(JsonFileStore::new(dir.path())));
    assert_eq!(tempo.bpm(), 80);
    assert_eq!(tempo.time_signature(), TimeSignature::FourFour);
}

#[test]
fn test_wrapped_document_with_bad_field() {
    let dir = TempDir::new().unwrap();
    let mut store = JsonFileStore::new(dir.path());
    store
        .set(
            STORE_KEY,
            r#"{"state":{"bpm":500,"timeSignature":"7/8"},"version":0}"#,
        )
        .unwrap();

    let tempo = TempoState::load(Box::new(store));
    assert_eq!(tempo.bpm(), 240);
    assert_eq!(tempo.time_signature(), TimeSignature::FourFour);
}

#[test]
fn test_corrupt_file_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("metronome-store.json"), "{not json").unwrap();

    let tempo = TempoState::load(Box::new(JsonFileStore::new(dir.path())));
    assert_eq!(tempo.bpm(), 80);
}
