//! Read-only views of the latest produced audio for on-screen rendering
//!
//! Rendering runs on the same thread and tick as buffer production, so the feed
//! borrows the live buffers instead of copying them. The borrow ends before the
//! next tick can refill them.

use crate::engine::{SynthParameters, WorkingBuffer};
use crate::gen::{NoiseSource, WaveformKind};
use crate::pcm::EncodedBuffer;

#[cfg(feature = "visualization")]
pub mod waveform_display;

#[cfg(feature = "visualization")]
pub use waveform_display::WaveformDisplay;

/// Snapshot of what the synth most recently produced
#[derive(Clone, Copy)]
pub struct VisualizationFeed<'a> {
    pub working: &'a WorkingBuffer,
    pub encoded: &'a EncodedBuffer,
    pub waveform: WaveformKind,
    pub frequency: f32,
    pub amplitude: f32,
}

impl<'a> VisualizationFeed<'a> {
    pub fn float_view(&self) -> SampleView<'a> {
        SampleView::Float(self.working)
    }

    pub fn pcm_view(&self) -> SampleView<'a> {
        SampleView::Pcm(self.encoded.as_bytes())
    }

    pub fn waveform_name(&self) -> &'static str {
        self.waveform.name()
    }
}

/// The two sample representations a renderer can draw
#[derive(Clone, Copy)]
pub enum SampleView<'a> {
    /// Raw encoded bytes, each byte plotted as its own point
    Pcm(&'a [u8]),
    /// Float samples; only channel 0 is drawn
    Float(&'a WorkingBuffer),
}

impl SampleView<'_> {
    /// Points in a `width` x `height` box, y growing downwards
    pub fn trace_into(&self, width: f32, height: f32, out: &mut Vec<[f32; 2]>) {
        match self {
            SampleView::Pcm(bytes) => {
                let scale = height / u8::MAX as f32;
                trace_into(bytes.iter().map(|b| *b as f32), width, |v| v * scale, out);
            }
            SampleView::Float(working) => {
                let half = height / 2.0;
                let samples = working.channel(0).iter().copied();
                trace_into(samples, width, |s| half + (s * half).clamp(-half, half), out);
            }
        }
    }

    pub fn trace(&self, width: f32, height: f32) -> Vec<[f32; 2]> {
        let mut points = Vec::new();
        self.trace_into(width, height, &mut points);
        points
    }
}

/// Spread `values` evenly across `width`, mapping each through `to_height`
pub fn trace_into<I, F>(values: I, width: f32, to_height: F, out: &mut Vec<[f32; 2]>)
where
    I: ExactSizeIterator<Item = f32>,
    F: Fn(f32) -> f32,
{
    out.clear();
    let count = values.len();
    if count == 0 {
        return;
    }
    let step = width / count as f32;
    out.extend(
        values
            .enumerate()
            .map(|(i, value)| [i as f32 * step, to_height(value)]),
    );
}

pub const PREVIEW_POINTS: usize = 500;

/// Pixel size of the waveform preview panel
pub const PREVIEW_SIZE: (f32, f32) = (1200.0, 360.0);

/// Plot of the current waveform function itself, independent of the audio buffers.
///
/// Noise is drawn from the preview's own source so redraws never consume the
/// audio stream's random values.
pub struct WaveformPreview {
    heights: Vec<f32>,
    height: f32,
    noise: NoiseSource,
    /// Time span on each side of zero, in seconds
    pub range_x: f32,
    /// Value that maps to the top (and negated, the bottom) edge
    pub range_y: f32,
}

impl WaveformPreview {
    pub fn new(height: f32) -> Self {
        Self {
            heights: vec![height / 2.0; PREVIEW_POINTS],
            height,
            noise: NoiseSource::from_entropy(),
            range_x: 1.0,
            range_y: 1.0,
        }
    }

    /// Resample the waveform described by `params` over `[-range_x, range_x)`
    pub fn update(&mut self, params: SynthParameters) {
        let step = 2.0 * self.range_x as f64 / PREVIEW_POINTS as f64;
        let start = -(self.range_x as f64);

        for (i, height) in self.heights.iter_mut().enumerate() {
            let time = start + i as f64 * step;
            let value = params
                .waveform
                .sample(params.frequency, params.amplitude, time, &mut self.noise)
                / self.range_y;
            // [-1, 1] to [0, 1], flipped because y points down
            let normalized = 1.0 - (value + 1.0) / 2.0;
            *height = normalized * self.height;
        }
    }

    pub fn heights(&self) -> &[f32] {
        &self.heights
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    /// Points across `width`, clamped to the preview box
    pub fn trace(&self, width: f32) -> Vec<[f32; 2]> {
        let mut points = Vec::with_capacity(self.heights.len());
        let height = self.height;
        trace_into(
            self.heights.iter().copied(),
            width,
            |h| h.clamp(0.0, height),
            &mut points,
        );
        points
    }
}
