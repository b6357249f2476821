use crate::error::{Result, SynthError};
use crate::gen::WaveformKind;

pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;
pub const DEFAULT_CHANNELS: u16 = 2;
pub const DEFAULT_FRAMES_PER_BUFFER: usize = 3000;
pub const DEFAULT_LOW_WATER_MARK: usize = 3;
pub const DEFAULT_HIGH_WATER_MARK: usize = 8;

pub const DEFAULT_FREQUENCY: f32 = 220.0;
pub const DEFAULT_AMPLITUDE: f32 = 1.0;

/// Bytes per encoded PCM16 sample
pub const BYTES_PER_SAMPLE: usize = 2;

/// Static shape of the synthesis pipeline, fixed for the lifetime of a session.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthConfig {
    pub sample_rate: u32,
    pub channels: u16,
    pub frames_per_buffer: usize,
    /// Refill whenever the device holds fewer buffers than this
    pub low_water_mark: usize,
    /// Never queue more buffers than this
    pub high_water_mark: usize,
    /// Upper bound on fill cycles in a single tick, even if the backlog stays low
    pub max_submissions_per_tick: usize,
    /// Per-channel frequency multiplier (e.g. `[2.0, 1.0]` plays the left channel an octave up)
    pub channel_frequency_scales: Vec<f32>,
    pub initial_frequency: f32,
    pub initial_amplitude: f32,
    pub initial_waveform: WaveformKind,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            channels: DEFAULT_CHANNELS,
            frames_per_buffer: DEFAULT_FRAMES_PER_BUFFER,
            low_water_mark: DEFAULT_LOW_WATER_MARK,
            high_water_mark: DEFAULT_HIGH_WATER_MARK,
            max_submissions_per_tick: DEFAULT_LOW_WATER_MARK,
            channel_frequency_scales: vec![1.0; DEFAULT_CHANNELS as usize],
            initial_frequency: DEFAULT_FREQUENCY,
            initial_amplitude: DEFAULT_AMPLITUDE,
            initial_waveform: WaveformKind::Sine,
        }
    }
}

impl SynthConfig {
    /// Mono configuration with otherwise default settings
    pub fn mono() -> Self {
        Self::default().with_channels(1)
    }

    /// Change the channel count, resetting the per-channel scales to 1.0
    pub fn with_channels(mut self, channels: u16) -> Self {
        self.channels = channels;
        self.channel_frequency_scales = vec![1.0; channels as usize];
        self
    }

    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn with_frames_per_buffer(mut self, frames: usize) -> Self {
        self.frames_per_buffer = frames;
        self
    }

    /// Set both marks, raising the per-tick submission bound to at least `low`
    /// so an empty device can still be topped up in one tick
    pub fn with_water_marks(mut self, low: usize, high: usize) -> Self {
        self.low_water_mark = low;
        self.high_water_mark = high;
        self.max_submissions_per_tick = self.max_submissions_per_tick.max(low);
        self
    }

    /// Cap the fill cycles run in one tick. A cap below the low-water mark
    /// spreads the top-up of an empty device over several ticks.
    pub fn with_max_submissions_per_tick(mut self, max: usize) -> Self {
        self.max_submissions_per_tick = max;
        self
    }

    pub fn with_channel_frequency_scales(mut self, scales: Vec<f32>) -> Self {
        self.channel_frequency_scales = scales;
        self
    }

    /// Length in bytes of one encoded buffer
    pub fn encoded_len(&self) -> usize {
        self.frames_per_buffer * self.channels as usize * BYTES_PER_SAMPLE
    }

    /// Playback duration of one buffer in seconds
    pub fn buffer_duration(&self) -> f64 {
        self.frames_per_buffer as f64 / self.sample_rate as f64
    }

    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(SynthError::InvalidConfig("sample rate must be positive".into()));
        }
        if !(1..=2).contains(&self.channels) {
            return Err(SynthError::InvalidConfig(format!(
                "unsupported channel count {} (expected 1 or 2)",
                self.channels
            )));
        }
        if self.frames_per_buffer == 0 {
            return Err(SynthError::InvalidConfig("frames per buffer must be positive".into()));
        }
        if self.low_water_mark == 0 {
            return Err(SynthError::InvalidConfig("low-water mark must be at least 1".into()));
        }
        if self.high_water_mark < self.low_water_mark {
            return Err(SynthError::InvalidConfig(format!(
                "high-water mark {} is below low-water mark {}",
                self.high_water_mark, self.low_water_mark
            )));
        }
        if self.max_submissions_per_tick == 0 {
            return Err(SynthError::InvalidConfig(
                "at least one submission per tick is required".into(),
            ));
        }
        if self.channel_frequency_scales.len() != self.channels as usize {
            return Err(SynthError::InvalidConfig(format!(
                "{} frequency scales given for {} channels",
                self.channel_frequency_scales.len(),
                self.channels
            )));
        }
        if let Some(bad) = self
            .channel_frequency_scales
            .iter()
            .find(|scale| !scale.is_finite() || **scale < 0.0)
        {
            return Err(SynthError::InvalidConfig(format!("invalid frequency scale {}", bad)));
        }
        Ok(())
    }
}
