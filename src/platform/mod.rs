//! Platform abstraction for audio output
//!
//! Defines the contract the buffer streamer drives (a queue of PCM16 buffers
//! with a backlog count) along with an in-memory virtual device and, with the
//! `native` feature, a CPAL-backed device.

use crate::config::BYTES_PER_SAMPLE;
use crate::error::{Result, SynthError};

pub mod queue;
pub mod virtual_output;

pub use queue::PlaybackQueue;
pub use virtual_output::VirtualOutput;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Stopped,
    Playing,
    Paused,
}

/// Trait for buffer-queue audio output devices
pub trait AudioOutput {
    fn sample_rate(&self) -> u32;

    fn channels(&self) -> u16;

    /// Buffers submitted but not yet fully played
    fn pending_buffer_count(&self) -> Result<usize>;

    /// Append one interleaved native-endian PCM16 buffer to the playback queue
    fn submit(&mut self, buffer: &[u8]) -> Result<()>;

    fn play(&mut self) -> Result<()>;

    fn pause(&mut self) -> Result<()>;

    fn resume(&mut self) -> Result<()>;

    /// Stop playback and discard everything queued
    fn stop(&mut self) -> Result<()>;

    fn volume(&self) -> f32;

    /// Set output gain, clamped to [0, 1]
    fn set_volume(&mut self, volume: f32);

    fn state(&self) -> PlaybackState;
}

/// Reject buffers that cannot be split into whole frames
pub fn check_buffer_shape(buffer: &[u8], channels: u16) -> Result<()> {
    let frame_bytes = channels as usize * BYTES_PER_SAMPLE;
    if buffer.is_empty() || frame_bytes == 0 || buffer.len() % frame_bytes != 0 {
        return Err(SynthError::DeviceFault(format!(
            "malformed buffer of {} bytes for {} channel(s)",
            buffer.len(),
            channels
        )));
    }
    Ok(())
}

// Platform-specific implementations
#[cfg(feature = "native")]
pub mod cpal_output;

#[cfg(feature = "native")]
pub use self::cpal_output::CpalOutput;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_shape() {
        assert!(check_buffer_shape(&[0; 8], 2).is_ok());
        assert!(check_buffer_shape(&[0; 6], 1).is_ok());
        assert!(check_buffer_shape(&[0; 6], 2).is_err());
        assert!(check_buffer_shape(&[], 2).is_err());
    }
}
