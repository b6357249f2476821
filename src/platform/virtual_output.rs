use super::{check_buffer_shape, AudioOutput, PlaybackQueue, PlaybackState};
use crate::config::BYTES_PER_SAMPLE;
use crate::error::{Result, SynthError};

/// In-memory output device driven by a manual playback clock.
///
/// Used for headless runs and tests. Queued buffers only drain when
/// `advance_frames` is called while playing.
pub struct VirtualOutput {
    queue: PlaybackQueue,
    sample_rate: u32,
    channels: u16,
    state: PlaybackState,
    volume: f32,
    // Consume every buffer on submission, so the backlog never rises
    instant: bool,
    fault: Option<String>,
    submitted: usize,
    frames_played: u64,
    last_submitted: Vec<u8>,
}

impl VirtualOutput {
    pub fn new(sample_rate: u32, channels: u16) -> Self {
        Self {
            queue: PlaybackQueue::new(),
            sample_rate,
            channels,
            state: PlaybackState::Stopped,
            volume: 1.0,
            instant: false,
            fault: None,
            submitted: 0,
            frames_played: 0,
            last_submitted: Vec::new(),
        }
    }

    /// A device that plays each buffer the moment it arrives
    pub fn instant(sample_rate: u32, channels: u16) -> Self {
        Self {
            instant: true,
            ..Self::new(sample_rate, channels)
        }
    }

    /// Make every following submission fail with `DeviceFault`
    pub fn inject_fault(&mut self, reason: impl Into<String>) {
        self.fault = Some(reason.into());
    }

    /// Let the playback clock run for `frames` frames. Returns frames actually played.
    pub fn advance_frames(&mut self, frames: usize) -> usize {
        if self.state != PlaybackState::Playing {
            return 0;
        }
        let played = self.queue.skip_frames(frames, self.channels as usize);
        self.frames_played += played as u64;
        played
    }

    /// Advance the clock by wall time at the device sample rate
    pub fn advance_seconds(&mut self, seconds: f64) -> usize {
        let frames = (seconds * self.sample_rate as f64).round() as usize;
        self.advance_frames(frames)
    }

    pub fn submitted_count(&self) -> usize {
        self.submitted
    }

    pub fn frames_played(&self) -> u64 {
        self.frames_played
    }

    pub fn last_submitted(&self) -> &[u8] {
        &self.last_submitted
    }
}

impl AudioOutput for VirtualOutput {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn channels(&self) -> u16 {
        self.channels
    }

    fn pending_buffer_count(&self) -> Result<usize> {
        Ok(self.queue.pending())
    }

    fn submit(&mut self, buffer: &[u8]) -> Result<()> {
        if let Some(reason) = &self.fault {
            return Err(SynthError::DeviceFault(reason.clone()));
        }
        check_buffer_shape(buffer, self.channels)?;

        self.submitted += 1;
        self.last_submitted.clear();
        self.last_submitted.extend_from_slice(buffer);

        if self.instant {
            let frames = buffer.len() / (self.channels as usize * BYTES_PER_SAMPLE);
            self.frames_played += frames as u64;
        } else {
            self.queue.push(buffer);
        }
        Ok(())
    }

    fn play(&mut self) -> Result<()> {
        self.state = PlaybackState::Playing;
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        if self.state == PlaybackState::Playing {
            self.state = PlaybackState::Paused;
        }
        Ok(())
    }

    fn resume(&mut self) -> Result<()> {
        if self.state == PlaybackState::Paused {
            self.state = PlaybackState::Playing;
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.queue.clear();
        self.state = PlaybackState::Stopped;
        Ok(())
    }

    fn volume(&self) -> f32 {
        self.volume
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    fn state(&self) -> PlaybackState {
        self.state
    }
}
