// Framing - slice a waveform into overlapping fixed-length frames

use crate::config::FeatureParams;

/// Frames of one utterance, stored contiguously frame after frame
#[derive(Debug, Clone, PartialEq)]
pub struct FrameMatrix {
    /// `num_frames * frame_len` samples, frame-major
    pub data: Vec<f32>,
    /// Raw waveform sample preceding each frame's first sample (0 for the
    /// first frame), captured before any stage touches frame content.
    /// Mean removal shifts each entry by its frame's mean.
    pub history: Vec<f32>,
    pub frame_len: usize,
}

impl FrameMatrix {
    pub fn num_frames(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Iterate over frames mutably, in signal order
    pub fn frames_mut(&mut self) -> std::slice::ChunksExactMut<'_, f32> {
        self.data.chunks_exact_mut(self.frame_len)
    }
}

/// Slice `signal` into `params.num_frames(signal.len())` frames of
/// `samples_per_frame` samples spaced `samples_per_stride` apart
///
/// Trailing samples that cannot fill a complete frame are discarded; a
/// signal shorter than one frame produces an empty matrix.
pub fn frame_signal(signal: &[f32], params: &FeatureParams) -> FrameMatrix {
    let frame_len = params.samples_per_frame();
    let stride = params.samples_per_stride();
    let num_frames = params.num_frames(signal.len());

    let mut data = Vec::with_capacity(num_frames * frame_len);
    let mut history = Vec::with_capacity(num_frames);
    for f in 0..num_frames {
        let start = f * stride;
        data.extend_from_slice(&signal[start..start + frame_len]);
        history.push(if start > 0 { signal[start - 1] } else { 0.0 });
    }

    FrameMatrix {
        data,
        history,
        frame_len,
    }
}
