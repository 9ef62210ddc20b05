// Main UI App - metronome controls and practice timer

use crate::messaging::channels::NotificationConsumer;
use crate::messaging::notification::{Notification, NotificationLevel};
use crate::metronome::{Metronome, MetronomeObserver, Snapshot};
use crate::scheduler::{Clock, MonotonicClock};
use crate::session::PracticeTimer;
use crate::sound::{SoundPort, SoundStatus};
use crate::tempo::{MAX_BPM, MIN_BPM, TimeSignature};
use eframe::egui;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::Path;
use std::rc::Rc;
use std::time::Duration;

pub type AppMetronome = Metronome<Box<dyn SoundPort>, MonotonicClock>;

const MAX_NOTIFICATIONS: usize = 10;
// Keeps the practice timer display moving while nothing else repaints
const IDLE_REPAINT: Duration = Duration::from_millis(250);

/// Collects metronome notifications for the status bar
struct NotificationSink(Rc<RefCell<VecDeque<Notification>>>);

impl MetronomeObserver for NotificationSink {
    fn on_snapshot(&mut self, _snapshot: &Snapshot) {}

    fn on_notification(&mut self, notification: &Notification) {
        let mut queue = self.0.borrow_mut();
        queue.push_back(notification.clone());
        if queue.len() > MAX_NOTIFICATIONS {
            queue.pop_front();
        }
    }
}

pub struct MetronomeApp {
    metronome: AppMetronome,
    practice: PracticeTimer,
    // Audio stream errors from the callback side
    notification_rx: NotificationConsumer,
    notification_queue: Rc<RefCell<VecDeque<Notification>>>,
}

impl MetronomeApp {
    pub fn new(
        mut metronome: AppMetronome,
        practice: PracticeTimer,
        notification_rx: NotificationConsumer,
    ) -> Self {
        let notification_queue = Rc::new(RefCell::new(VecDeque::new()));
        metronome.subscribe(NotificationSink(Rc::clone(&notification_queue)));

        Self {
            metronome,
            practice,
            notification_rx,
            notification_queue,
        }
    }

    /// Load the click sounds; a failure ends up in the status bar
    pub fn load_sounds(&mut self, accent: &Path, normal: &Path) {
        if self.metronome.load_sounds(accent, normal).is_err() {
            log::warn!("Continuing without click sounds");
        }
    }

    fn now_ms(&self) -> f64 {
        self.metronome.clock().now_ms()
    }

    /// Move notifications from the audio ringbuffer into the queue
    fn update_notifications(&mut self) {
        let mut queue = self.notification_queue.borrow_mut();
        while let Some(notification) =
            ringbuf::traits::Consumer::try_pop(&mut self.notification_rx)
        {
            queue.push_back(notification);
            if queue.len() > MAX_NOTIFICATIONS {
                queue.pop_front();
            }
        }
    }

    /// Notifications younger than 5 seconds, newest first
    fn recent_notifications(&self) -> Vec<Notification> {
        self.notification_queue
            .borrow()
            .iter()
            .rev()
            .filter(|n| n.is_recent(5000))
            .take(3)
            .cloned()
            .collect()
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        // Shortcuts are disabled while a text field has focus
        if ctx.wants_keyboard_input() {
            return;
        }

        let (space, tap, up, down) = ctx.input(|i| {
            (
                i.key_pressed(egui::Key::Space),
                i.key_pressed(egui::Key::T),
                i.key_pressed(egui::Key::ArrowUp),
                i.key_pressed(egui::Key::ArrowDown),
            )
        });

        if space {
            self.metronome.toggle();
        }
        if tap {
            self.metronome.tap();
        }
        if up {
            self.metronome.adjust_bpm(1);
        }
        if down {
            self.metronome.adjust_bpm(-1);
        }
    }

    fn draw_beats(&self, ui: &mut egui::Ui, snapshot: &Snapshot) {
        ui.horizontal(|ui| {
            for beat in 0..snapshot.beats_per_bar() {
                let is_current = snapshot.current_beat == beat as i32;
                let color = match (is_current, beat) {
                    (true, 0) => egui::Color32::from_rgb(255, 120, 60),
                    (true, _) => egui::Color32::from_rgb(100, 150, 255),
                    (false, _) => egui::Color32::from_gray(60),
                };

                let (rect, _) = ui.allocate_exact_size(egui::vec2(36.0, 36.0), egui::Sense::hover());
                ui.painter().circle_filled(rect.center(), 14.0, color);
            }
        });
    }

    fn draw_tempo(&mut self, ui: &mut egui::Ui, snapshot: &Snapshot) {
        ui.horizontal(|ui| {
            if ui.button("-10").clicked() {
                self.metronome.adjust_bpm(-10);
            }
            if ui.button("-1").clicked() {
                self.metronome.adjust_bpm(-1);
            }

            ui.label(egui::RichText::new(format!("{} BPM", snapshot.bpm)).size(32.0));

            if ui.button("+1").clicked() {
                self.metronome.adjust_bpm(1);
            }
            if ui.button("+10").clicked() {
                self.metronome.adjust_bpm(10);
            }
        });

        let mut bpm = snapshot.bpm;
        if ui
            .add(egui::Slider::new(&mut bpm, MIN_BPM..=MAX_BPM).text("BPM"))
            .changed()
        {
            self.metronome.set_bpm(bpm as f64);
        }

        ui.horizontal(|ui| {
            ui.label("Time signature:");
            let mut selected = snapshot.time_signature;
            egui::ComboBox::from_id_salt("time_signature_selector")
                .selected_text(selected.label())
                .show_ui(ui, |ui| {
                    for signature in TimeSignature::ALL {
                        ui.selectable_value(&mut selected, signature, signature.label());
                    }
                });

            if selected != snapshot.time_signature {
                self.metronome.set_time_signature(selected);
            }
        });
    }

    fn draw_transport(&mut self, ui: &mut egui::Ui, snapshot: &Snapshot) {
        ui.horizontal(|ui| {
            let loading = snapshot.sound_status == SoundStatus::Loading;
            let label = if snapshot.is_playing { "STOP" } else { "PLAY" };

            if ui
                .add_enabled(!loading, egui::Button::new(label).min_size(egui::vec2(100.0, 40.0)))
                .clicked()
            {
                self.metronome.toggle();
            }

            let tap = ui
                .add(egui::Button::new("TAP").min_size(egui::vec2(100.0, 40.0)))
                .on_hover_text("Tap along to set the tempo (T)");
            if tap.clicked() {
                self.metronome.tap();
            }

            let (dot, color) = match snapshot.sound_status {
                SoundStatus::Ready => ("●", egui::Color32::GREEN),
                SoundStatus::Loading => ("●", egui::Color32::YELLOW),
                SoundStatus::Failed => ("●", egui::Color32::RED),
                SoundStatus::Unloaded => ("○", egui::Color32::GRAY),
            };
            ui.colored_label(color, dot)
                .on_hover_text(format!("Sounds: {:?}", snapshot.sound_status));
        });
    }

    fn draw_practice_timer(&mut self, ui: &mut egui::Ui) {
        let now = self.now_ms();

        ui.heading("Practice session");
        ui.horizontal(|ui| {
            ui.label(egui::RichText::new(self.practice.format_elapsed(now)).size(24.0).monospace());

            let label = if self.practice.is_running() { "Pause" } else { "Start" };
            if ui.button(label).clicked() {
                self.practice.toggle(now);
            }
            if ui.button("Reset").clicked() {
                self.practice.reset();
            }
        });
        ui.add(egui::ProgressBar::new(self.practice.progress(now)).show_percentage());
    }

    fn draw_status_bar(&self, ui: &mut egui::Ui) {
        ui.separator();
        ui.horizontal(|ui| {
            let recent_notifications = self.recent_notifications();

            if recent_notifications.is_empty() {
                ui.label("Ready");
            } else {
                for notification in recent_notifications {
                    let (icon, color) = match notification.level {
                        NotificationLevel::Info => ("ℹ", egui::Color32::from_rgb(100, 150, 255)),
                        NotificationLevel::Warning => ("⚠", egui::Color32::from_rgb(255, 165, 0)),
                        NotificationLevel::Error => ("✖", egui::Color32::RED),
                    };

                    ui.colored_label(color, icon);
                    ui.colored_label(color, &notification.message);
                    ui.add_space(10.0);
                }
            }
        });
    }
}

impl eframe::App for MetronomeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.metronome.poll();
        self.update_notifications();
        self.handle_shortcuts(ctx);

        let snapshot = self.metronome.snapshot();

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Practice Metronome");
            ui.separator();
            ui.add_space(10.0);

            self.draw_beats(ui, &snapshot);
            ui.add_space(10.0);
            self.draw_tempo(ui, &snapshot);
            ui.add_space(10.0);
            self.draw_transport(ui, &snapshot);

            ui.add_space(20.0);
            ui.separator();
            self.draw_practice_timer(ui);

            ui.add_space(10.0);
            self.draw_status_bar(ui);
        });

        // Wake up for the next beat
        let wake = self.metronome.next_wake().unwrap_or(IDLE_REPAINT);
        ctx.request_repaint_after(wake.min(IDLE_REPAINT));
    }
}

impl Drop for MetronomeApp {
    fn drop(&mut self) {
        self.metronome.shutdown();
    }
}
