use crate::config::BYTES_PER_SAMPLE;
use std::collections::VecDeque;

/// FIFO of submitted PCM16 buffers as seen by a playback clock.
///
/// A buffer counts as pending until its last frame has been read. Played-out
/// buffers are kept as spares so steady-state submission does not allocate.
#[derive(Debug, Default)]
pub struct PlaybackQueue {
    buffers: VecDeque<Vec<u8>>,
    cursor: usize,
    spare: Vec<Vec<u8>>,
}

impl PlaybackQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy `bytes` to the back of the queue
    pub fn push(&mut self, bytes: &[u8]) {
        let mut buffer = self.spare.pop().unwrap_or_default();
        buffer.clear();
        buffer.extend_from_slice(bytes);
        self.buffers.push_back(buffer);
    }

    pub fn pending(&self) -> usize {
        self.buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    /// Read the next frame into `out` (one `i16` per channel).
    ///
    /// Returns false and leaves `out` untouched when the queue has run dry.
    pub fn read_frame(&mut self, out: &mut [i16]) -> bool {
        let frame_bytes = out.len() * BYTES_PER_SAMPLE;

        let Some(front) = self.buffers.front() else {
            return false;
        };

        for (channel, sample) in out.iter_mut().enumerate() {
            let index = self.cursor + channel * BYTES_PER_SAMPLE;
            *sample = i16::from_ne_bytes([front[index], front[index + 1]]);
        }

        self.cursor += frame_bytes;
        if self.cursor + frame_bytes > front.len() {
            self.retire_front();
        }
        true
    }

    /// Drop up to `frames` frames without decoding them, returning how many were skipped
    pub fn skip_frames(&mut self, frames: usize, channels: usize) -> usize {
        let frame_bytes = channels * BYTES_PER_SAMPLE;
        let mut remaining = frames;

        while remaining > 0 {
            let Some(front) = self.buffers.front() else {
                break;
            };
            let available = (front.len() - self.cursor) / frame_bytes;
            let step = available.min(remaining);
            self.cursor += step * frame_bytes;
            remaining -= step;

            if self.cursor + frame_bytes > front.len() {
                self.retire_front();
            }
        }

        frames - remaining
    }

    /// Discard everything queued
    pub fn clear(&mut self) {
        while !self.buffers.is_empty() {
            self.retire_front();
        }
    }

    fn retire_front(&mut self) {
        if let Some(done) = self.buffers.pop_front() {
            self.spare.push(done);
        }
        self.cursor = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stereo_buffer(frames: usize, value: i16) -> Vec<u8> {
        (0..frames * 2).flat_map(|_| value.to_ne_bytes()).collect()
    }

    #[test]
    fn test_buffers_play_in_order() {
        let mut queue = PlaybackQueue::new();
        queue.push(&stereo_buffer(2, 100));
        queue.push(&stereo_buffer(1, -5));
        assert_eq!(queue.pending(), 2);

        let mut frame = [0i16; 2];
        assert!(queue.read_frame(&mut frame));
        assert_eq!(frame, [100, 100]);
        assert_eq!(queue.pending(), 2);

        assert!(queue.read_frame(&mut frame));
        assert_eq!(queue.pending(), 1);

        assert!(queue.read_frame(&mut frame));
        assert_eq!(frame, [-5, -5]);
        assert_eq!(queue.pending(), 0);

        assert!(!queue.read_frame(&mut frame));
    }

    #[test]
    fn test_skip_spans_buffers() {
        let mut queue = PlaybackQueue::new();
        queue.push(&stereo_buffer(3, 1));
        queue.push(&stereo_buffer(3, 2));

        assert_eq!(queue.skip_frames(4, 2), 4);
        assert_eq!(queue.pending(), 1);

        let mut frame = [0i16; 2];
        assert!(queue.read_frame(&mut frame));
        assert_eq!(frame, [2, 2]);

        assert_eq!(queue.skip_frames(10, 2), 1);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_clear_recycles_buffers() {
        let mut queue = PlaybackQueue::new();
        queue.push(&stereo_buffer(4, 9));
        queue.push(&stereo_buffer(4, 9));
        queue.clear();
        assert_eq!(queue.pending(), 0);
        assert_eq!(queue.spare.len(), 2);

        queue.push(&stereo_buffer(4, 9));
        assert_eq!(queue.spare.len(), 1);
    }
}
