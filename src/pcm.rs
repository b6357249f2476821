//! Float to interleaved native-endian PCM16 conversion

use crate::config::BYTES_PER_SAMPLE;
use crate::engine::WorkingBuffer;

/// Convert one float sample to PCM16.
///
/// Input is clamped to [-1, 1]. Positive values scale by 32767 and negative
/// values by 32768 so both ends of the `i16` range are reachable.
pub fn to_pcm16(sample: f32) -> i16 {
    let clamped = sample.clamp(-1.0, 1.0);
    if clamped >= 0.0 {
        (clamped * i16::MAX as f32) as i16
    } else {
        (clamped * -(i16::MIN as f32)) as i16
    }
}

/// Interleave `from` into `to` as native-endian PCM16 (L R L R ...).
///
/// # Panics
/// If `to` is not exactly `frames * channels * 2` bytes long. A mismatch means
/// the pipeline was wired with inconsistent buffer shapes.
pub fn encode_into(from: &WorkingBuffer, to: &mut [u8]) {
    let channels = from.channels();
    let frames = from.frames();

    assert_eq!(
        to.len(),
        frames * channels * BYTES_PER_SAMPLE,
        "Buffer sizes are mismatched"
    );

    for frame in 0..frames {
        for channel in 0..channels {
            let bytes = to_pcm16(from.get(channel, frame)).to_ne_bytes();
            let index = frame * channels * BYTES_PER_SAMPLE + channel * BYTES_PER_SAMPLE;
            to[index..index + BYTES_PER_SAMPLE].copy_from_slice(&bytes);
        }
    }
}

/// Byte buffer handed to the output device, overwritten on every encode.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedBuffer {
    bytes: Vec<u8>,
    channels: usize,
    frames: usize,
}

impl EncodedBuffer {
    pub fn new(channels: usize, frames: usize) -> Self {
        Self {
            bytes: vec![0; frames * channels * BYTES_PER_SAMPLE],
            channels,
            frames,
        }
    }

    /// Sized to match `working`
    pub fn for_working(working: &WorkingBuffer) -> Self {
        Self::new(working.channels(), working.frames())
    }

    pub fn encode(&mut self, from: &WorkingBuffer) -> &[u8] {
        encode_into(from, &mut self.bytes);
        &self.bytes
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Decode the sample stored for `channel` at `frame`
    pub fn sample(&self, channel: usize, frame: usize) -> i16 {
        let index = frame * self.channels * BYTES_PER_SAMPLE + channel * BYTES_PER_SAMPLE;
        i16::from_ne_bytes([self.bytes[index], self.bytes[index + 1]])
    }
}
