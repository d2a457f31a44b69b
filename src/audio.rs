//! Audio output handling and click synthesis

use crate::error::{AppError, AppResult};
use cpal::traits::{DeviceTrait, HostTrait};
use std::sync::{Arc, Mutex};

/// Audio configuration and device information
pub struct AudioConfig {
    pub device_name: String,
    pub sample_rate: u32,
    pub channels: u16,
}

/// Find and configure an audio output device
pub fn setup_output_device(device_name: Option<String>) -> AppResult<(cpal::Device, AudioConfig)> {
    let host = cpal::default_host();

    // Get output device
    let device = if let Some(name) = device_name {
        host.output_devices()?
            .find(|d| d.name().map(|n| n == name).unwrap_or(false))
            .ok_or_else(|| AppError::AudioDevice("Specified device not found".to_string()))?
    } else {
        host.default_output_device()
            .ok_or_else(|| AppError::AudioDevice("No default output device available".to_string()))?
    };

    let device_name = device.name()?;

    // Get supported output configs and determine sample rate from device
    let mut supported_configs = device.supported_output_configs()?;
    let config_range = supported_configs
        .next()
        .ok_or_else(|| AppError::AudioDevice("No supported output configs found".to_string()))?;

    // Use the minimum sample rate as default, or a common rate if available
    let sample_rate =
        if config_range.min_sample_rate().0 <= 44100 && config_range.max_sample_rate().0 >= 44100 {
            44100 // Prefer 44.1kHz if supported
        } else {
            config_range.min_sample_rate().0 // Otherwise use minimum supported
        };

    // Ensure channels are supported
    let channels = if config_range.channels() >= crate::constants::audio::DEFAULT_CHANNELS {
        crate::constants::audio::DEFAULT_CHANNELS
    } else {
        config_range.channels()
    };

    let audio_config = AudioConfig {
        device_name,
        sample_rate,
        channels,
    };

    Ok((device, audio_config))
}

/// Synthesize the metronome click: a short sine burst with exponential decay
pub fn generate_click(sample_rate: u32) -> Vec<f32> {
    let freq = crate::constants::click::FREQ_HZ;
    let duration = crate::constants::click::DURATION_SECS;
    let decay_rate = crate::constants::click::DECAY_RATE;
    let gain = crate::constants::click::GAIN;

    let num_samples = (sample_rate as f32 * duration) as usize;
    let mut samples = Vec::with_capacity(num_samples);

    for i in 0..num_samples {
        let t = i as f32 / sample_rate as f32;
        let envelope = (-t * decay_rate).exp();
        samples.push((t * freq * std::f32::consts::TAU).sin() * envelope * gain);
    }

    samples
}

/// Rewinds the click playhead from the tick handler; the output callback
/// drains it on the audio thread
pub struct ClickTrigger {
    playhead: Arc<Mutex<usize>>,
}

impl ClickTrigger {
    /// Create a trigger whose playhead starts past the end of a click of
    /// `click_len` samples, so nothing sounds until the first tick.
    pub fn new(click_len: usize) -> Self {
        Self {
            playhead: Arc::new(Mutex::new(click_len)),
        }
    }

    /// Start the click from the top on the next audio buffer.
    pub fn trigger(&self) {
        *self.playhead.lock().unwrap() = 0;
    }

    /// Shared playhead handle for the output callback.
    pub fn playhead(&self) -> Arc<Mutex<usize>> {
        Arc::clone(&self.playhead)
    }
}

/// Build an audio output stream with the given callback
pub fn build_click_stream<F>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    data_callback: F,
) -> AppResult<cpal::Stream>
where
    F: FnMut(&mut [f32], &cpal::OutputCallbackInfo) + Send + 'static,
{
    let stream = device.build_output_stream(
        config,
        data_callback,
        |err| eprintln!("Audio stream error: {}", err),
        None,
    )?;

    Ok(stream)
}

/// Output callback that plays the click wave from the shared playhead and
/// writes silence once it has been drained
pub fn create_click_callback(
    wave: Vec<f32>,
    playhead: Arc<Mutex<usize>>,
    channels: u16,
) -> impl FnMut(&mut [f32], &cpal::OutputCallbackInfo) + Send + 'static {
    move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
        let mut pos = playhead.lock().unwrap();
        mix_click(&wave, &mut pos, data, channels);
    }
}

/// Fill an interleaved output buffer from the click wave, advancing `pos`
fn mix_click(wave: &[f32], pos: &mut usize, data: &mut [f32], channels: u16) {
    for frame in data.chunks_mut(channels as usize) {
        let sample = if *pos < wave.len() {
            let s = wave[*pos];
            *pos += 1;
            s
        } else {
            0.0
        };
        for out in frame.iter_mut() {
            *out = sample;
        }
    }
}
