use practice_metronome::ui::MetronomeApp;
use practice_metronome::{
    AppConfig, CpalSoundPort, Metronome, MonotonicClock, MutedSoundPort, PracticeTimer,
    SoundPort, TempoState, create_notification_channel,
};
use std::sync::{Arc, Mutex};

const NOTIFICATION_RINGBUFFER_CAPACITY: usize = 64;

fn main() {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("practice_metronome=info"),
    )
    .init();

    log::info!("Practice Metronome {}", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::read();

    // Notification channel for audio stream errors
    let (notification_tx, notification_rx) =
        create_notification_channel(NOTIFICATION_RINGBUFFER_CAPACITY);
    let notification_tx = Arc::new(Mutex::new(notification_tx));

    let store = match config.open_store() {
        Ok(store) => store,
        Err(e) => {
            log::error!("Cannot open settings store: {}", e);
            return;
        }
    };
    let tempo = TempoState::load(Box::new(store));

    let sound: Box<dyn SoundPort> = match CpalSoundPort::open(config.volume, notification_tx) {
        Ok(port) => Box::new(port),
        Err(e) => {
            log::warn!("Audio output unavailable ({}), running silently", e);
            Box::new(MutedSoundPort)
        }
    };

    let metronome = Metronome::new(tempo, sound, MonotonicClock::new())
        .with_tap_estimator(config.tap_estimator());
    let practice = PracticeTimer::with_target(config.practice_target_secs);

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([480.0, 420.0])
            .with_title("Practice Metronome"),
        ..Default::default()
    };

    let result = eframe::run_native(
        "Practice Metronome",
        native_options,
        Box::new(move |_cc| {
            let mut app = MetronomeApp::new(metronome, practice, notification_rx);

            // Loaded after the UI subscribed so a failure shows in the status bar
            app.load_sounds(&config.accent_sample, &config.normal_sample);

            Ok(Box::new(app))
        }),
    );

    if let Err(e) = result {
        log::error!("UI error: {}", e);
    }
}
