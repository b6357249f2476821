//! Keeps an output device fed with encoded buffers
//!
//! Each tick tops the device backlog up to the low-water mark with
//! fill → encode → submit cycles and then returns. It never blocks and never
//! runs more than a bounded number of cycles per tick.

use crate::config::SynthConfig;
use crate::engine::Engine;
use crate::error::Result;
use crate::pcm::EncodedBuffer;
use crate::platform::{AudioOutput, PlaybackState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BacklogState {
    FilledEnough,
    NeedsFill,
}

/// What a single tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickReport {
    /// Device backlog observed at the start of the tick
    pub backlog_before: usize,
    pub submitted: usize,
    /// Backlog after this tick's submissions, as modeled by the streamer
    pub backlog_after: usize,
    /// The per-tick submission bound stopped the tick short of the low-water mark
    pub bounded: bool,
}

pub struct BufferStreamer {
    encoded: EncodedBuffer,
    low_water_mark: usize,
    high_water_mark: usize,
    max_submissions_per_tick: usize,
    submitted_total: u64,
    underruns: u64,
    bounded_streak: bool,
    /// Device backlog read back at the end of the previous tick
    held_after_last_tick: usize,
}

impl BufferStreamer {
    pub fn new(config: &SynthConfig) -> Self {
        Self {
            encoded: EncodedBuffer::new(config.channels as usize, config.frames_per_buffer),
            low_water_mark: config.low_water_mark,
            high_water_mark: config.high_water_mark,
            max_submissions_per_tick: config.max_submissions_per_tick,
            submitted_total: 0,
            underruns: 0,
            bounded_streak: false,
            held_after_last_tick: 0,
        }
    }

    pub fn backlog_state(&self, backlog: usize) -> BacklogState {
        if backlog < self.low_water_mark {
            BacklogState::NeedsFill
        } else {
            BacklogState::FilledEnough
        }
    }

    pub fn tick<O: AudioOutput + ?Sized>(&mut self, engine: &mut Engine, output: &mut O) -> Result<TickReport> {
        let backlog_before = output.pending_buffer_count()?;

        // Only a device that held buffers after the last tick can have run dry
        if backlog_before == 0 && self.held_after_last_tick > 0 && output.state() == PlaybackState::Playing {
            self.underruns += 1;
            log::debug!("Output backlog ran dry, refilling ({} underruns so far)", self.underruns);
        }

        let mut backlog = backlog_before;
        let mut submitted = 0;

        while self.backlog_state(backlog) == BacklogState::NeedsFill
            && backlog < self.high_water_mark
            && submitted < self.max_submissions_per_tick
        {
            self.submit_one(engine, output)?;
            submitted += 1;
            backlog += 1;
        }

        let bounded = self.backlog_state(backlog) == BacklogState::NeedsFill;
        if bounded && !self.bounded_streak {
            log::warn!(
                "Submission bound of {} per tick reached with backlog at {} (low-water mark {})",
                self.max_submissions_per_tick,
                backlog,
                self.low_water_mark
            );
        }
        self.bounded_streak = bounded;
        self.held_after_last_tick = output.pending_buffer_count()?;

        Ok(TickReport {
            backlog_before,
            submitted,
            backlog_after: backlog,
            bounded,
        })
    }

    /// One fill → encode → submit cycle
    fn submit_one<O: AudioOutput + ?Sized>(&mut self, engine: &mut Engine, output: &mut O) -> Result<()> {
        let working = engine.fill();
        let bytes = self.encoded.encode(working);
        output.submit(bytes)?;

        self.submitted_total += 1;
        log::trace!(
            "Submitted buffer #{} ({} bytes, clock at {:.4}s)",
            self.submitted_total,
            bytes.len(),
            engine.clock().time()
        );
        Ok(())
    }

    /// The most recently submitted buffer
    pub fn encoded(&self) -> &EncodedBuffer {
        &self.encoded
    }

    pub fn submitted_total(&self) -> u64 {
        self.submitted_total
    }

    pub fn underruns(&self) -> u64 {
        self.underruns
    }

    pub fn low_water_mark(&self) -> usize {
        self.low_water_mark
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gen::NoiseSource;
    use crate::platform::VirtualOutput;

    #[test]
    fn test_backlog_states() {
        let streamer = BufferStreamer::new(&SynthConfig::default());
        assert_eq!(streamer.backlog_state(0), BacklogState::NeedsFill);
        assert_eq!(streamer.backlog_state(2), BacklogState::NeedsFill);
        assert_eq!(streamer.backlog_state(3), BacklogState::FilledEnough);
    }

    #[test]
    fn test_satisfied_backlog_is_a_no_op() {
        let config = SynthConfig::default().with_frames_per_buffer(16);
        let mut engine = Engine::new(&config, NoiseSource::seeded(1)).unwrap();
        let mut output = VirtualOutput::new(config.sample_rate, config.channels);
        let mut streamer = BufferStreamer::new(&config);

        streamer.tick(&mut engine, &mut output).unwrap();
        let frames = engine.clock().frames_elapsed();

        let report = streamer.tick(&mut engine, &mut output).unwrap();
        assert_eq!(report.submitted, 0);
        assert_eq!(engine.clock().frames_elapsed(), frames);
    }
}
