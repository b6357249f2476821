//! Per-tick orchestration: input step, buffer streaming, preview refresh

use crate::config::SynthConfig;
use crate::engine::Engine;
use crate::error::{Result, SynthError};
use crate::gen::NoiseSource;
use crate::input::{InputTracker, Key};
use crate::platform::AudioOutput;
use crate::streaming::{BufferStreamer, TickReport};
use crate::visualization::{VisualizationFeed, WaveformPreview, PREVIEW_SIZE};

/// Amplitude change per tick while Up/Down is held
pub const AMPLITUDE_STEP: f32 = 0.005;
/// Frequency change in Hz per tick while Right/Left is held
pub const FREQUENCY_STEP: f32 = 0.2;

pub const TITLE_PREFIX: &str = "WaveSynth";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Running(TickReport),
    Quit,
}

pub struct Synth<O: AudioOutput> {
    engine: Engine,
    streamer: BufferStreamer,
    output: O,
    preview: WaveformPreview,
}

impl<O: AudioOutput> Synth<O> {
    pub fn new(config: &SynthConfig, noise: NoiseSource, output: O) -> Result<Self> {
        let engine = Engine::new(config, noise)?;

        if output.channels() != config.channels || output.sample_rate() != config.sample_rate {
            return Err(SynthError::InvalidConfig(format!(
                "output is {} channel(s) at {} Hz, synth expects {} channel(s) at {} Hz",
                output.channels(),
                output.sample_rate(),
                config.channels,
                config.sample_rate
            )));
        }

        let mut preview = WaveformPreview::new(PREVIEW_SIZE.1);
        preview.update(engine.parameters());

        Ok(Self {
            streamer: BufferStreamer::new(config),
            engine,
            output,
            preview,
        })
    }

    pub fn start(&mut self) -> Result<()> {
        log::info!("Starting synth: {}", self.title());
        self.output.play()
    }

    pub fn stop(&mut self) -> Result<()> {
        self.output.stop()
    }

    /// Run one tick. Input is applied before the fill so the whole tick sees one parameter snapshot.
    pub fn tick(&mut self, input: &InputTracker) -> Result<TickOutcome> {
        if input.is_key_down(Key::Escape) {
            return Ok(TickOutcome::Quit);
        }

        self.apply_input(input)?;

        let report = self.streamer.tick(&mut self.engine, &mut self.output)?;
        self.preview.update(self.engine.parameters());

        Ok(TickOutcome::Running(report))
    }

    fn apply_input(&mut self, input: &InputTracker) -> Result<()> {
        if input.is_key_down(Key::Up) {
            self.engine.adjust_amplitude(AMPLITUDE_STEP);
        } else if input.is_key_down(Key::Down) {
            self.engine.adjust_amplitude(-AMPLITUDE_STEP);
        }

        if input.is_key_down(Key::Right) {
            self.engine.adjust_frequency(FREQUENCY_STEP);
        } else if input.is_key_down(Key::Left) {
            self.engine.adjust_frequency(-FREQUENCY_STEP);
        }

        if input.was_just_pressed(Key::P) {
            self.output.pause()?;
        }
        if input.was_just_pressed(Key::R) {
            self.output.resume()?;
        }

        if input.was_just_pressed(Key::Space) {
            let selected = if input.is_key_down(Key::Shift) {
                self.engine.select_previous()
            } else {
                self.engine.select_next()
            };
            log::info!("Waveform: {}", selected);
        }

        Ok(())
    }

    /// Latest produced buffers, valid until the next tick
    pub fn feed(&self) -> VisualizationFeed<'_> {
        VisualizationFeed {
            working: self.engine.working_buffer(),
            encoded: self.streamer.encoded(),
            waveform: self.engine.waveform(),
            frequency: self.engine.frequency(),
            amplitude: self.engine.amplitude(),
        }
    }

    pub fn title(&self) -> String {
        let waveform = self.engine.waveform();
        if waveform.is_noise() {
            format!("{} - {}", TITLE_PREFIX, waveform.name())
        } else {
            format!(
                "{} - {} @ {:.0} Hz",
                TITLE_PREFIX,
                waveform.name(),
                self.engine.frequency()
            )
        }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut Engine {
        &mut self.engine
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn output_mut(&mut self) -> &mut O {
        &mut self.output
    }

    pub fn preview(&self) -> &WaveformPreview {
        &self.preview
    }

    pub fn streamer(&self) -> &BufferStreamer {
        &self.streamer
    }
}
