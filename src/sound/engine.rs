// Click engine - cpal output stream playing the metronome clicks
//
// # Threading
//
// The metronome runs on the UI thread. The only thing that crosses into the
// audio callback is a `Command`, pushed into a lock-free ring buffer and
// drained at the start of every callback. Playback is fire-and-forget: the
// scheduler never waits for the audio thread.
//
// # Format Support
//
// The callback renders f32 internally and converts with cpal's
// `FromSample<f32>` when writing the device buffer (F32, I16 and U16 devices).

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, FromSample, Sample, SampleFormat, SizedSample, Stream, StreamConfig};
use ringbuf::traits::{Consumer, Producer};
use std::path::Path;
use std::sync::{Arc, Mutex};

use super::click::{ClickBank, ClickVoice};
use super::loader::load_click;
use super::{ClickType, SoundError, SoundPort, SoundStatus};
use crate::messaging::channels::{
    CommandConsumer, CommandProducer, NotificationProducer, create_command_channel,
};
use crate::messaging::command::Command;
use crate::messaging::notification::{Notification, NotificationCategory};

// A click per beat at 240 BPM is 4 commands/s; 64 slots absorb any UI stall
const COMMAND_RINGBUFFER_CAPACITY: usize = 64;

/// Apply one command to the callback-owned voice
pub(crate) fn apply_command(voice: &mut ClickVoice, command: Command) {
    match command {
        Command::PlayClick(click_type) => voice.trigger(click_type),
        Command::LoadBank(bank) => voice.set_bank(bank),
        Command::SetVolume(volume) => voice.set_volume(volume),
        Command::Silence => voice.reset(),
    }
}

/// Render interleaved frames, duplicating the mono click on every channel
pub(crate) fn render_frames<T>(data: &mut [T], channels: usize, voice: &mut ClickVoice)
where
    T: SizedSample + FromSample<f32>,
{
    for frame in data.chunks_mut(channels.max(1)) {
        let sample = T::from_sample(voice.process_sample());
        for channel_sample in frame.iter_mut() {
            *channel_sample = sample;
        }
    }
}

pub struct ClickEngine {
    _device: Device,
    _stream: Stream,
    sample_rate: u32,
    channels: usize,
}

impl ClickEngine {
    pub fn new(
        command_rx: CommandConsumer,
        volume: f32,
        notification_tx: Arc<Mutex<NotificationProducer>>,
    ) -> Result<Self, SoundError> {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(SoundError::NoDevice)?;

        log::info!(
            "Audio device: {}",
            device.name().unwrap_or_else(|_| "Unknown".to_string())
        );

        let supported_config = device
            .default_output_config()
            .map_err(|e| SoundError::Stream(e.to_string()))?;

        let sample_format = supported_config.sample_format();
        let sample_rate = supported_config.sample_rate().0;
        let channels = supported_config.channels() as usize;
        let config: StreamConfig = supported_config.into();

        log::debug!("Sample format: {:?}", sample_format);

        let voice = ClickVoice::new(volume);

        let stream = match sample_format {
            SampleFormat::F32 => {
                Self::build_stream::<f32>(&device, &config, channels, command_rx, voice, notification_tx)
            }
            SampleFormat::I16 => {
                Self::build_stream::<i16>(&device, &config, channels, command_rx, voice, notification_tx)
            }
            SampleFormat::U16 => {
                Self::build_stream::<u16>(&device, &config, channels, command_rx, voice, notification_tx)
            }
            other => Err(SoundError::Stream(format!(
                "Unsupported sample format: {:?}. Supported formats: F32, I16, U16",
                other
            ))),
        }?;

        stream
            .play()
            .map_err(|e| SoundError::Stream(e.to_string()))?;

        log::info!("Click engine started: {} Hz, {} channels", sample_rate, channels);

        Ok(Self {
            _device: device,
            _stream: stream,
            sample_rate,
            channels,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    fn build_stream<T>(
        device: &Device,
        config: &StreamConfig,
        channels: usize,
        mut command_rx: CommandConsumer,
        mut voice: ClickVoice,
        notification_tx: Arc<Mutex<NotificationProducer>>,
    ) -> Result<Stream, SoundError>
    where
        T: SizedSample + FromSample<f32> + Send + 'static,
    {
        device
            .build_output_stream(
                config,
                move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                    // No allocations, no I/O, no blocking locks in here
                    while let Some(command) = command_rx.try_pop() {
                        apply_command(&mut voice, command);
                    }
                    render_frames(data, channels, &mut voice);
                },
                move |err| {
                    // Runs outside the audio callback, I/O is fine here
                    log::error!("Audio stream error: {}", err);

                    if let Ok(mut tx) = notification_tx.try_lock() {
                        let notif = Notification::error(
                            NotificationCategory::Audio,
                            format!("Audio stream error: {}", err),
                        );
                        let _ = tx.try_push(notif);
                    }
                },
                None,
            )
            .map_err(|e| SoundError::Stream(e.to_string()))
    }
}

/// SoundPort backed by a cpal output stream
pub struct CpalSoundPort {
    engine: ClickEngine,
    command_tx: CommandProducer,
    status: SoundStatus,
    // Keeps the current bank alive on the UI side of the channel
    _bank: Option<Arc<ClickBank>>,
}

impl CpalSoundPort {
    /// Open the default output device
    pub fn open(
        volume: f32,
        notification_tx: Arc<Mutex<NotificationProducer>>,
    ) -> Result<Self, SoundError> {
        let (command_tx, command_rx) = create_command_channel(COMMAND_RINGBUFFER_CAPACITY);
        let engine = ClickEngine::new(command_rx, volume, notification_tx)?;

        Ok(Self {
            engine,
            command_tx,
            status: SoundStatus::Loading,
            _bank: None,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.engine.sample_rate()
    }

    pub fn set_volume(&mut self, volume: f32) {
        if self.send(Command::SetVolume(volume.clamp(0.0, 1.0))).is_err() {
            log::warn!("Volume change dropped: command queue full");
        }
    }

    fn send(&mut self, command: Command) -> Result<(), SoundError> {
        self.command_tx
            .try_push(command)
            .map_err(|_| SoundError::QueueFull)
    }

    fn decode_bank(&self, accent: &Path, normal: &Path) -> Result<ClickBank, SoundError> {
        let rate = self.engine.sample_rate();
        let accent = load_click(accent)?.resampled(rate)?;
        let normal = load_click(normal)?.resampled(rate)?;
        Ok(ClickBank::new(accent.samples, normal.samples))
    }
}

impl SoundPort for CpalSoundPort {
    fn load_sounds(&mut self, accent: &Path, normal: &Path) -> Result<(), SoundError> {
        self.status = SoundStatus::Loading;

        let bank = match self.decode_bank(accent, normal) {
            Ok(bank) => Arc::new(bank),
            Err(e) => {
                self.status = SoundStatus::Failed;
                return Err(e);
            }
        };

        if let Err(e) = self.send(Command::LoadBank(Some(Arc::clone(&bank)))) {
            self.status = SoundStatus::Failed;
            return Err(e);
        }

        self._bank = Some(bank);
        self.status = SoundStatus::Ready;
        Ok(())
    }

    fn status(&self) -> SoundStatus {
        self.status
    }

    fn play(&mut self, click: ClickType) {
        if !self.status.is_ready() {
            return;
        }
        if self.send(Command::PlayClick(click)).is_err() {
            log::debug!("Click dropped: command queue full");
        }
    }

    fn unload(&mut self) {
        if self.send(Command::LoadBank(None)).is_err() {
            log::warn!("Unload dropped: command queue full");
        }
        self.status = SoundStatus::Unloaded;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded_voice() -> ClickVoice {
        let mut voice = ClickVoice::new(1.0);
        apply_command(
            &mut voice,
            Command::LoadBank(Some(Arc::new(ClickBank::new(vec![0.5; 4], vec![0.25; 4])))),
        );
        voice
    }

    #[test]
    fn test_commands_drive_voice() {
        let mut voice = loaded_voice();
        assert!(voice.has_bank());

        apply_command(&mut voice, Command::PlayClick(ClickType::Normal));
        assert!(voice.is_playing());

        apply_command(&mut voice, Command::Silence);
        assert!(!voice.is_playing());

        apply_command(&mut voice, Command::SetVolume(0.5));
        assert_eq!(voice.volume(), 0.5);

        apply_command(&mut voice, Command::LoadBank(None));
        assert!(!voice.has_bank());
    }

    #[test]
    fn test_render_duplicates_mono_on_all_channels() {
        let mut voice = loaded_voice();
        apply_command(&mut voice, Command::PlayClick(ClickType::Accent));

        let mut data = vec![0.0f32; 12]; // 6 stereo frames
        render_frames(&mut data, 2, &mut voice);

        assert_eq!(&data[..8], &[0.5; 8]);
        assert_eq!(&data[8..], &[0.0; 4]);
    }

    #[test]
    fn test_render_converts_to_integer_formats() {
        let mut voice = loaded_voice();
        apply_command(&mut voice, Command::PlayClick(ClickType::Accent));

        let mut data = vec![0i16; 2];
        render_frames(&mut data, 1, &mut voice);
        assert!(data[0] > 16000);

        let mut silent = vec![0u16; 2];
        render_frames(&mut silent, 1, &mut ClickVoice::new(1.0));
        assert!(silent.iter().all(|&s| (32767..=32768).contains(&s)));
    }
}
