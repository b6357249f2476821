/// Per-channel float samples for one submission, reused every fill cycle.
///
/// Storage is channel-major: all frames of channel 0, then channel 1.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkingBuffer {
    samples: Vec<f32>,
    channels: usize,
    frames: usize,
}

impl WorkingBuffer {
    pub fn new(channels: usize, frames: usize) -> Self {
        Self {
            samples: vec![0.0; channels * frames],
            channels,
            frames,
        }
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn channel(&self, channel: usize) -> &[f32] {
        let start = channel * self.frames;
        &self.samples[start..start + self.frames]
    }

    pub fn channel_mut(&mut self, channel: usize) -> &mut [f32] {
        let start = channel * self.frames;
        &mut self.samples[start..start + self.frames]
    }

    pub fn get(&self, channel: usize, frame: usize) -> f32 {
        self.samples[channel * self.frames + frame]
    }

    pub fn set(&mut self, channel: usize, frame: usize, value: f32) {
        self.samples[channel * self.frames + frame] = value;
    }

    pub fn clear(&mut self) {
        self.samples.fill(0.0);
    }
}
