//! Real-time waveform synthesizer with a double-buffered PCM16 output pipeline
//!
//! The synth fills a float buffer from the selected waveform, encodes it to
//! interleaved native-endian PCM16 and keeps an output device's queue topped
//! up, all from a single-threaded per-tick loop. The most recent buffers stay
//! readable for on-screen visualization.

pub mod config;
pub mod error;

// Signal generation
pub mod engine;
pub mod gen;
pub mod pcm;

// Output and the per-tick loop
pub mod platform;
pub mod streaming;
pub mod synth;

// Front-end plumbing
pub mod input;
pub mod utils;
pub mod visualization;

pub use config::SynthConfig;
pub use engine::{Engine, PhaseClock, SynthParameters, WorkingBuffer};
pub use error::{Result, SynthError};
pub use gen::{NoiseSource, WaveformKind};
pub use pcm::EncodedBuffer;
pub use streaming::{BufferStreamer, TickReport};
pub use synth::{Synth, TickOutcome};
