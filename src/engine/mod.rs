//! Synthesis engine: parameters, phase clock and buffer fill

pub mod buffer;

pub use buffer::WorkingBuffer;

use crate::config::SynthConfig;
use crate::error::Result;
use crate::gen::{NoiseSource, WaveformKind};

/// Parameters read by every fill cycle.
///
/// No bounds are enforced here. Out-of-range amplitudes are clamped by the PCM
/// encoder, and frequencies at or below zero are passed through unchanged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SynthParameters {
    pub frequency: f32,
    pub amplitude: f32,
    pub waveform: WaveformKind,
}

impl SynthParameters {
    pub fn new(frequency: f32, amplitude: f32, waveform: WaveformKind) -> Self {
        Self {
            frequency,
            amplitude,
            waveform,
        }
    }
}

/// Monotonic session time, advanced one frame at a time.
///
/// Time is derived from a frame counter rather than summed increments, so it
/// never drifts and is exact at every buffer boundary.
#[derive(Debug, Clone, Copy)]
pub struct PhaseClock {
    frames: u64,
    sample_rate: f64,
}

impl PhaseClock {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            frames: 0,
            sample_rate: sample_rate as f64,
        }
    }

    /// Seconds since the session started
    pub fn time(&self) -> f64 {
        self.frames as f64 / self.sample_rate
    }

    pub fn frames_elapsed(&self) -> u64 {
        self.frames
    }

    pub fn advance(&mut self) {
        self.frames += 1;
    }

    pub fn step(&self) -> f64 {
        1.0 / self.sample_rate
    }
}

pub struct Engine {
    params: SynthParameters,
    clock: PhaseClock,
    working: WorkingBuffer,
    channel_scales: Vec<f32>,
    noise: NoiseSource,
    sample_rate: u32,
}

impl Engine {
    pub fn new(config: &SynthConfig, noise: NoiseSource) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            params: SynthParameters::new(
                config.initial_frequency,
                config.initial_amplitude,
                config.initial_waveform,
            ),
            clock: PhaseClock::new(config.sample_rate),
            working: WorkingBuffer::new(config.channels as usize, config.frames_per_buffer),
            channel_scales: config.channel_frequency_scales.clone(),
            noise,
            sample_rate: config.sample_rate,
        })
    }

    /// Sample the selected waveform into the working buffer.
    ///
    /// The clock advances once per frame, so every channel of a frame is
    /// evaluated at the same instant.
    pub fn fill(&mut self) -> &WorkingBuffer {
        let params = self.params;

        for frame in 0..self.working.frames() {
            let time = self.clock.time();
            for (channel, scale) in self.channel_scales.iter().enumerate() {
                let frequency = params.frequency * scale;
                let value = params
                    .waveform
                    .sample(frequency, params.amplitude, time, &mut self.noise);
                self.working.set(channel, frame, value);
            }
            self.clock.advance();
        }

        &self.working
    }

    pub fn working_buffer(&self) -> &WorkingBuffer {
        &self.working
    }

    pub fn parameters(&self) -> SynthParameters {
        self.params
    }

    pub fn set_parameters(&mut self, params: SynthParameters) {
        self.params = params;
    }

    pub fn clock(&self) -> &PhaseClock {
        &self.clock
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> usize {
        self.working.channels()
    }

    pub fn frames_per_buffer(&self) -> usize {
        self.working.frames()
    }

    pub fn frequency(&self) -> f32 {
        self.params.frequency
    }

    pub fn set_frequency(&mut self, frequency: f32) {
        self.params.frequency = frequency;
    }

    pub fn adjust_frequency(&mut self, delta: f32) {
        self.params.frequency += delta;
    }

    pub fn amplitude(&self) -> f32 {
        self.params.amplitude
    }

    pub fn set_amplitude(&mut self, amplitude: f32) {
        self.params.amplitude = amplitude;
    }

    pub fn adjust_amplitude(&mut self, delta: f32) {
        self.params.amplitude += delta;
    }

    pub fn waveform(&self) -> WaveformKind {
        self.params.waveform
    }

    /// Takes effect on the next fill, with no crossfade
    pub fn set_waveform(&mut self, waveform: WaveformKind) {
        self.params.waveform = waveform;
    }

    pub fn select_next(&mut self) -> WaveformKind {
        self.params.waveform = self.params.waveform.next();
        self.params.waveform
    }

    pub fn select_previous(&mut self) -> WaveformKind {
        self.params.waveform = self.params.waveform.previous();
        self.params.waveform
    }

    pub fn channel_scales(&self) -> &[f32] {
        &self.channel_scales
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_is_exact_at_buffer_boundaries() {
        let mut clock = PhaseClock::new(44100);
        for _ in 0..44100 {
            clock.advance();
        }
        assert_eq!(clock.time(), 1.0);
        assert_eq!(clock.frames_elapsed(), 44100);
    }

    #[test]
    fn test_scaled_channel_runs_faster() {
        let config = SynthConfig::default()
            .with_frames_per_buffer(64)
            .with_channel_frequency_scales(vec![2.0, 1.0]);
        let mut engine = Engine::new(&config, NoiseSource::seeded(3)).unwrap();
        engine.set_frequency(441.0);
        let buffer = engine.fill();

        // 882 Hz at 44.1 kHz is a 50-frame period; 441 Hz is 100 frames
        let left = buffer.channel(0);
        let right = buffer.channel(1);
        assert!((left[10] - right[20]).abs() < 1e-5);
        assert!(left[10] > 0.9);
        assert!(left[50].abs() < 1e-4);
    }
}
